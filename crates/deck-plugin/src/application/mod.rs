//! Application layer: everything the router needs, with no socket in sight.
//!
//! # For beginners
//!
//! - [`action`]          – the `Action` trait plugins implement, and `ActionContext`
//! - [`catalog`]         – action type descriptors, validated once at startup
//! - [`instances`]       – live instances and their controller kinds, by context
//! - [`long_press`]      – the per-context short/long press state machine
//! - [`global_settings`] – the local mirror of the plugin-wide settings
//! - [`delegate`]        – process-wide hooks and `PluginError`
//! - [`runtime`]         – `PluginRuntime`, which routes decoded events to all of the above
//!
//! The only thing this layer knows about the outside world is the
//! [`Outbound`](crate::infrastructure::outbound::Outbound) queue it pushes
//! commands onto.

pub mod action;
pub mod catalog;
pub mod delegate;
pub mod global_settings;
pub mod instances;
pub mod long_press;
pub mod runtime;
