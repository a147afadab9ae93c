#![doc = "mpcfill-drive-core: core logic library for mpcfill-drive."]

//! This crate contains the Drive scraping pipeline and the MPCFill manifest model.
//! The CLI, config file loading and all filesystem access live in the `mpcfill-drive` crate.
//!
//! # Usage
//! - [`identity::extract`] turns a share link into a [`drive::ResourceIdentifier`].
//! - [`traverse::traverse`] (or [`listing::list`] for a single page) discovers entries
//!   through any [`contract::PageFetcher`].
//! - [`generate::generate`] builds a [`manifest::Manifest`]; [`combine::combine`] merges several.

pub mod combine;
pub mod config;
pub mod contract;
pub mod directive;
pub mod drive;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod identity;
pub mod listing;
pub mod manifest;
pub mod traverse;
