pub mod backend;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;
pub mod url;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use backend::GenerationBackend;
pub use session::{SessionStore, SessionUser, StaticSessions};
pub use storage::MediaStore;
pub use types::{
    Article, Concept, GenerationOutcome, GenerationRequest, Media, Persona, ScrapedContent, Style,
};
