//! Calendar, economy, tick scheduler, and command processing for the
//! Geopolitics 2025 simulation.
//!
//! This crate owns the one piece of shared mutable state in the system, the
//! [`WorldState`], and the two paths that mutate it: the scheduler's ticks
//! and observers' control commands. Both go through the [`Simulation`]
//! handle, which serializes every mutate-and-publish step.
//!
//! # Modules
//!
//! - [`catalog`] -- Validated nations/leaders/alliances and difficulty tiers.
//! - [`clock`] -- Simulated calendar, one day per tick.
//! - [`command`] -- Inbound control frame parsing and application.
//! - [`config`] -- Configuration loading from `geopolitics-config.yaml`.
//! - [`diplomacy`] -- Relation matrix, sanctions, and trade partners.
//! - [`economy`] -- GDP growth, trade, and sanction calculations.
//! - [`events`] -- Narrative event generation and the bounded event log.
//! - [`roster`] -- Built-in starting nations, alliances, and relations.
//! - [`runner`] -- The never-exiting tick scheduler.
//! - [`simulation`] -- Single-writer handle and snapshot publishing.
//! - [`tick`] -- A single tick.
//! - [`world`] -- The world state and its snapshots.
//!
//! [`WorldState`]: world::WorldState
//! [`Simulation`]: simulation::Simulation

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod diplomacy;
pub mod economy;
pub mod events;
pub mod roster;
pub mod runner;
pub mod simulation;
pub mod tick;
pub mod world;
