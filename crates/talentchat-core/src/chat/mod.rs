//! Chat session: conversation engine, transcript persistence, and the widget
//! that ties them to the intake gate.

pub mod engine;
pub mod persister;
pub mod registry;
pub mod repository;
pub mod widget;
