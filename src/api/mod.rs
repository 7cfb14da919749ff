pub mod spotify;

pub use spotify::SpotifyClient;
