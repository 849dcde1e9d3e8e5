// Notice drafting: the fixed letter template, the pluggable drafter and the
// delivery helpers used by the download and mail hand-off routes.

pub mod assembler;
pub mod delivery;
pub mod drafter;
pub mod handlers;
pub mod models;
pub mod prompts;
