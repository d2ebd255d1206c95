//! The library code for the `inkpost` blog server. Everything is prepared
//! once at startup and then served read-only:
//!
//! 1. Parsing documents from markdown files on disk ([`crate::document`],
//!    [`crate::loader`])
//! 2. Resolving the landing page ([`crate::landing`])
//! 3. Grouping documents into the navigation sidebar ([`crate::navigation`])
//! 4. Registering a route per slug ([`crate::routes`]) and loading the
//!    templates ([`crate::templates`])
//!
//! [`crate::site`] ties these steps together and [`crate::server`] puts the
//! result behind HTTP. Pages are rendered per request from the prepared data;
//! the source files are never read again after startup.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod config;
pub mod document;
pub mod landing;
pub mod loader;
pub mod markdown;
pub mod navigation;
pub mod page;
pub mod routes;
pub mod server;
pub mod site;
pub mod templates;
