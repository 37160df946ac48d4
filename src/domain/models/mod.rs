pub mod event;
pub mod membership;
pub mod page;
pub mod photo;
pub mod policy;

pub use event::*;
pub use membership::*;
pub use page::*;
pub use photo::*;
pub use policy::*;
