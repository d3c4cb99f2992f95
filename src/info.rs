use crate::refs::{ObjectReferences, RefType};
use chrono::{Datelike, NaiveDateTime, Timelike};
use pdf_writer::{Date, Pdf, TextStr};

/// Metadata for the PDF document information dictionary
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Info {
    pub title: Option<String>,
    pub subject: Option<String>,
    /// Comma separated, e.g. the ids of the threats in the report
    pub keywords: Option<String>,
    /// Local time the report was generated
    pub created: Option<NaiveDateTime>,
}

impl Info {
    pub fn new() -> Info {
        Info::default()
    }

    pub fn title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn keywords<S: Into<String>>(mut self, keywords: S) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }

    pub(crate) fn write(&self, refs: &mut ObjectReferences, writer: &mut Pdf) {
        let mut dict = writer.document_info(refs.gen(RefType::Info));

        if let Some(title) = &self.title {
            dict.title(TextStr(title.as_str()));
        }
        if let Some(subject) = &self.subject {
            dict.subject(TextStr(subject.as_str()));
        }
        if let Some(keywords) = &self.keywords {
            dict.keywords(TextStr(keywords.as_str()));
        }
        dict.creator(TextStr(concat!(
            env!("CARGO_PKG_NAME"),
            " v",
            env!("CARGO_PKG_VERSION")
        )));

        // no UTC offset: the timestamp is the reader's wall clock time
        if let Some(at) = self.created {
            dict.creation_date(
                Date::new(at.year().clamp(0, 9999) as u16)
                    .month(at.month() as u8)
                    .day(at.day() as u8)
                    .hour(at.hour() as u8)
                    .minute(at.minute() as u8)
                    .second(at.second() as u8),
            );
        }
    }
}
