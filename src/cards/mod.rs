//! Cards: instances, behavior scripts, and the template library.

mod card;
mod library;
mod script;

pub use card::{Card, CardId, CardType};
pub use library::{CallbackDefinition, CardDefinition, CardLibrary};
pub use script::{CardScript, ScriptCondition};
