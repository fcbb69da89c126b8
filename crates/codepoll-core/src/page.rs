//! In-memory view model: the code list and the countdown.
//!
//! The controller mutates a `Page` and hands it to a `Renderer` as one batch,
//! so a refresh never shows a half-merged list.

use std::collections::HashMap;

use crate::model::{CodeId, CodeSet};

/// Text shown in place of the code list once fetching has failed for good.
pub const ERROR_MESSAGE: &str = "Error loading codes :(";

/// One rendered account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: CodeId,
    pub name: String,
    pub value: String,
}

impl Row {
    pub fn element_id(&self) -> String {
        self.id.element_id()
    }
}

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub updated: usize,
    pub appended: usize,
}

/// Ordered rows keyed by code id. Rows are only ever added or updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBoard {
    rows: Vec<Row>,
    index: HashMap<CodeId, usize>,
}

impl CodeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &CodeId) -> Option<&Row> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    /// Update rows whose id is already present, append the rest in server order.
    /// Rows missing from `set` are left untouched.
    pub fn merge(&mut self, set: &CodeSet) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for code in &set.codes {
            match self.index.get(&code.id) {
                Some(&i) => {
                    self.rows[i].value.clone_from(&code.value);
                    outcome.updated += 1;
                }
                None => {
                    self.index.insert(code.id.clone(), self.rows.len());
                    self.rows.push(Row {
                        id: code.id.clone(),
                        name: code.name.clone(),
                        value: code.value.clone(),
                    });
                    outcome.appended += 1;
                }
            }
        }
        outcome
    }
}

/// The code list area: rows, or the error text that replaced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodesArea {
    Rows(CodeBoard),
    Error(String),
}

/// State of the countdown element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountdownView {
    /// Visible but empty.
    #[default]
    Blank,
    /// Whole seconds until the codes rotate.
    Seconds(u64),
    /// Hidden after a terminal fetch failure.
    Hidden,
}

impl CountdownView {
    /// Seconds currently displayed, if any.
    pub fn seconds(self) -> Option<u64> {
        match self {
            CountdownView::Seconds(n) => Some(n),
            CountdownView::Blank | CountdownView::Hidden => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub codes: CodesArea,
    pub countdown: CountdownView,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            codes: CodesArea::Rows(CodeBoard::new()),
            countdown: CountdownView::Blank,
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently on the page (empty while the error is shown).
    pub fn rows(&self) -> &[Row] {
        match &self.codes {
            CodesArea::Rows(board) => board.rows(),
            CodesArea::Error(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.codes {
            CodesArea::Error(msg) => Some(msg),
            CodesArea::Rows(_) => None,
        }
    }

    /// Merge a fetched set into the list. A previous error is replaced by a fresh board.
    pub fn apply_codes(&mut self, set: &CodeSet) -> MergeOutcome {
        if let CodesArea::Error(_) = self.codes {
            self.codes = CodesArea::Rows(CodeBoard::new());
            self.countdown = CountdownView::Blank;
        }
        match &mut self.codes {
            CodesArea::Rows(board) => board.merge(set),
            CodesArea::Error(_) => MergeOutcome::default(),
        }
    }

    /// `Some(n)` shows n seconds, `None` blanks the countdown.
    pub fn show_countdown(&mut self, secs: Option<u64>) {
        self.countdown = match secs {
            Some(n) => CountdownView::Seconds(n),
            None => CountdownView::Blank,
        };
    }

    /// Replace the code list with the error text and hide the countdown.
    pub fn show_error(&mut self) {
        self.codes = CodesArea::Error(ERROR_MESSAGE.to_string());
        self.countdown = CountdownView::Hidden;
    }
}
