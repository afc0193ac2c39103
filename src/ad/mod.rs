pub mod media_url;
pub mod model;
pub mod pool;
pub mod selection;
pub mod skip;

pub use model::{Advertisement, InvalidAd, SkipCategory, SlotType};
pub use pool::{AdPoolProvider, FilePoolProvider, HttpPoolProvider, StaticPoolProvider};
pub use selection::select_candidate;
pub use skip::{SkipStatus, update_progress};
