//! Sentinel — client for a community shelter registry.
//!
//! Browse, create, edit and delete shelters against the registry's REST
//! backend, with email/password identity from an external provider. The
//! app's screens are modelled as controllers in `screens`, composed by
//! `app::App`; the `sentinel` binary drives the gateway from the command
//! line.

pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod gateway;
pub mod identity;
pub mod notice;
pub mod router;
pub mod screens;
pub mod shelter;
pub mod validation;

#[cfg(test)]
mod test_helpers;
