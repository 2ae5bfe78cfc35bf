//! # doc-crawler
//!
//! A recursive document and archive crawler that catalogs extracted text
//! into a flat, ordered CSV.
//!
//! The crawler walks a storage tree of office documents, spreadsheets,
//! PDFs, and archives — archives nested arbitrarily deep inside other
//! archives included — and emits one record per discovered document:
//! sequential id, provenance chain, byte identity, and normalized
//! single-line text content.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ Orchestrator │──▶│   Unpacker     │──▶│   Scratch     │
//! │ walk+classify│   │ worklist, DFS  │   │ TempDir pool  │
//! └──────┬───────┘   └───────┬───────┘   └──────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌──────────────┐   ┌───────────────┐   ┌──────────────┐
//! │  Extractor   │──▶│    Session     │──▶│   CSV sink    │
//! │ docx/xls/pdf │   │ ordered records│   │ fixed columns │
//! └──────────────┘   └───────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docrawl crawl                         # walk ./storage, export ./output/extracted_data.csv
//! docrawl crawl -s /data/docs -o out.csv
//! docrawl formats                       # show archive capability status
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Record type and extension classification |
//! | [`identity`] | Byte size, content hash, creation timestamp |
//! | [`extract`] | Format dispatch and text normalization |
//! | [`archive`] | Archive reader strategies and capability registry |
//! | [`unpack`] | Worklist-driven recursive unpacking |
//! | [`session`] | Run-scoped record sequence and scratch space |
//! | [`crawl`] | Walk orchestration and record assembly |
//! | [`export`] | CSV catalog sink |
//! | [`progress`] | Stderr progress reporting |

pub mod archive;
pub mod config;
pub mod crawl;
pub mod export;
pub mod extract;
pub mod identity;
pub mod models;
pub mod progress;
pub mod session;
pub mod unpack;
