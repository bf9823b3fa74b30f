// Application layer: the list/build/test commands on top of the core.

pub mod commands;
