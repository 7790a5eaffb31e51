//! `souk-engine` computes everything the dashboard displays.
//!
//! The crate is UI-independent:
//! - [`FilterSet`] turns multi-select choices into a row mask over the table.
//! - [`TableView`] pairs the immutable table with a mask.
//! - Grouping helpers ([`count_by`], [`sum_by`], ...) produce [`Grouped`]
//!   results, tolerating absent columns by returning empty groupings.
//! - [`build_sections`] composes a page from its declarative chart table,
//!   emitting either chart specs or inline warnings per section.
//!
//! Rendering is someone else's job: chart specs carry column-name bindings
//! and aggregated rows, never widget state.

#![forbid(unsafe_code)]

mod age;
mod aggregate;
mod filter;
mod page;
mod view;

pub use crate::age::{age_group, sum_by_age_group, AGE_GROUPS, AGE_GROUP_COLUMN};
pub use crate::aggregate::{count_by, sum_by, sum_by_pair, top_n, GroupRow, Grouped, COUNT_COLUMN};
pub use crate::filter::{filter_options, DimensionFilter, FilterSet};
pub use crate::page::{build_sections, ChartKind, ChartSpec, Page, Section, VALUE_COLUMN};
pub use crate::view::TableView;
