//! The immutable snapshot of what the user asked to export.

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// How selected threats are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Each threat with its own objects and implementation methods
    #[default]
    #[serde(alias = "threats")]
    PerItem,
    /// Objects and methods of all selected threats, each listed once
    Summary,
}

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Selection, view and filter captured at the moment the export was requested
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    selection: Vec<String>,
    view: ViewMode,
    search: Option<String>,
    generated_at: NaiveDateTime,
}

impl ExportRequest {
    /// Snapshot a selection in the order given. Repeated ids keep their first
    /// position. The timestamp is the current local time.
    pub fn new<I, S>(selection: I, view: ViewMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = Vec::new();
        for id in selection.into_iter().map(Into::into) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        ExportRequest {
            selection: ids,
            view,
            search: None,
            generated_at: Local::now().naive_local(),
        }
    }

    /// Only include objects and methods matching `term`, case-insensitively.
    /// The filter applies to the exported document itself: threats without a
    /// matching entry are left out of the PDF, not just hidden from a listing.
    /// A blank term disables filtering.
    pub fn with_search<S: AsRef<str>>(mut self, term: S) -> Self {
        let term = term.as_ref().trim().to_lowercase();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Pin the generation time, e.g. for reproducible output
    pub fn generated_at(mut self, at: NaiveDateTime) -> Self {
        self.generated_at = at;
        self
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// The lowercased search term, if filtering is on
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.generated_at
    }

    /// Generation time as printed under the report title, e.g. `18 октября 2026 г. в 09:05`
    pub fn timestamp_label(&self) -> String {
        let at = self.generated_at;
        format!(
            "{} {} {} г. в {:02}:{:02}",
            at.day(),
            MONTHS_GENITIVE[at.month0() as usize],
            at.year(),
            at.hour(),
            at.minute()
        )
    }

    /// Name the downloaded report is saved under. The date is the local one,
    /// the same day printed under the title, not the UTC date.
    pub fn file_name(&self) -> String {
        format!(
            "Отчет_по_угрозам_{}.pdf",
            self.generated_at.date().format("%Y-%m-%d")
        )
    }
}
