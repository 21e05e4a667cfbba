//! Category bitflags (spec §4.12: "messages classified by (type code,
//! category bitflag, sender id)"). A subscriber registers interest in one
//! or more categories; a published message is delivered to every
//! subscription whose flags intersect the message's category.

use bitflags::bitflags;

bitflags! {
    pub struct MessageCategory: u32 {
        const CLEANUP = 0b0000_0001;
        const RECOMPILE = 0b0000_0010;
        const RESOURCE_INVALIDATION = 0b0000_0100;
        const ALL = 0b0000_0111;
    }
}
