pub mod abuse_shield;
pub mod cors;
