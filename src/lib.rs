//! sitesift - site crawler with content classification and smart filtering.
//!
//! Crawls a website breadth-first from a seed URL, extracts structured text
//! from each page, classifies and scores the content, and applies an ordered
//! multi-criteria filter to select pages for downstream use.

pub mod classify;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod models;
pub mod utils;
