/*!
# Alifia Gumbira

Leaderboard, registration and bazaar site for a neighbourhood celebration,
backed by a Google spreadsheet or by a local workbook file.

## Overview

Competition results are appended to a `Leaderboard` tab as they come in.
Team standings are never stored: every page and API call that shows them
recomputes the table from the full result log with
[`standings::compute_standings`].

## Ranking

Teams are ordered by total points, then gold, silver and bronze counts, all
descending. Teams that are level on all four keep their roster order. A
result counts for a team only if its team name matches the roster entry
exactly.

## Data stores

- **Google Sheets**: `GoogleSheetsClient` talks to the Sheets v4 REST API with
  a bearer access token or an API key, configured through `SheetsConfig`
- **Local workbook**: `LocalWorkbook` keeps named tabs in memory and persists
  them as a gzip-compressed bincode file

When a read fails the service returns the error, unless demo fallback is
switched on, in which case sample rows are served and flagged so the pages
show a demo banner.

## Modules

- **standings**: Standings engine (aggregation, tie-break ordering, short names)
- **catalog**: Teams, competitions per category, business types, points table
- **records**: Sheet row layouts and typed records, participant filters and stats
- **range**: A1 range parsing and column letters
- **validation**: Form validation with per-field errors
- **workbook**: Local sheet store with compressed snapshots
- **demo**: Sample rows for demo mode
- **sheets**: Store trait, errors, configuration and the Google Sheets client
- **service**: Typed event operations and fallback policy
- **config**: Command-line and environment settings
- **pages**: Handlebars-rendered HTML pages
- **app**: Routing and handlers

## REST API Endpoints

- `/api/standings` - Ranked standings
- `/api/sheets/leaderboard` - Result log (GET, POST; PUT and DELETE answer 501)
- `/api/participants`, `/api/bazaar` - Registrations
- `/api/catalog` - Teams, competitions and points table
- `/api/sheets/get`, `/api/sheets/append` - Raw range access
- `/api/sheets/test` - Connection check
*/

pub mod catalog;
pub mod demo;
pub mod range;
pub mod records;
pub mod sheets;
pub mod standings;
pub mod validation;
pub mod workbook;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod pages;
#[cfg(feature = "web")]
pub mod service;

pub use standings::{Standing, compute_standings, short_team_name};
