use crate::config::SpawnArea;
use crate::notes::catalog::NoteCatalog;
use crate::notes::{NoteColor, NoteId, NoteRecord, NoteSnapshot};
use chrono::{Local, NaiveDateTime};

/// Owner of live note windows. The synchronizer only ever sees window state
/// through [`NoteSnapshot`]s.
pub trait WindowHost {
    fn open(&mut self, snapshot: NoteSnapshot);

    fn snapshot(&self, id: &str) -> Option<NoteSnapshot>;

    fn live_ids(&self) -> Vec<NoteId>;

    fn focus(&mut self, id: &str) -> bool;

    fn recolor(&mut self, id: &str, color: &NoteColor) -> bool;

    /// Drops the window without reporting its state back.
    fn destroy(&mut self, id: &str) -> bool;

    fn is_live(&self, id: &str) -> bool {
        self.snapshot(id).is_some()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Keeps the note catalog consistent with the live windows of a [`WindowHost`].
/// All catalog writes go through here; views read the catalog only after
/// [`NoteSync::reconcile_all`].
pub struct NoteSync<H: WindowHost> {
    catalog: NoteCatalog,
    host: H,
    spawn_area: SpawnArea,
    clock: fn() -> NaiveDateTime,
}

impl<H: WindowHost> NoteSync<H> {
    pub fn new(host: H, spawn_area: SpawnArea) -> Self {
        Self {
            catalog: NoteCatalog::new(),
            host,
            spawn_area,
            clock: local_now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &NoteCatalog {
        &self.catalog
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Opens a window. With a record, that record is (re)used under its own
    /// id; an id that already has a live window is focused instead of
    /// duplicated. Without one, a fresh note is allocated.
    pub fn create_window(&mut self, record: Option<NoteRecord>) -> NoteId {
        let mut record = match record {
            Some(record) => {
                if self.host.is_live(record.id.as_str()) {
                    let id = record.id;
                    self.host.focus(id.as_str());
                    self.pull(id.as_str());
                    log::debug!("note already open, focused id={id}");
                    return id;
                }
                record
            }
            None => {
                let id = NoteId::generate((self.clock)(), |raw| {
                    self.catalog.contains(raw) || self.host.is_live(raw)
                });
                let (x, y) = self.spawn_area.pick();
                NoteRecord::new(id, x, y)
            }
        };

        record.normalize();
        record.mark_open();
        let id = record.id.clone();
        self.host.open(record.snapshot());
        if self.catalog.upsert(record) {
            log::info!("note created id={id}");
        } else {
            log::info!("note opened id={id}");
        }
        id
    }

    /// Opens the catalog record `id`, focusing its window if it is already live.
    pub fn open_record(&mut self, id: &str) -> bool {
        let Some(record) = self.catalog.get(id).cloned() else {
            log::debug!("open ignored, unknown id={id}");
            return false;
        };
        self.create_window(Some(record));
        true
    }

    pub fn on_window_focus_lost(&mut self, id: &str) -> bool {
        self.pull(id)
    }

    pub fn on_window_edit(&mut self, id: &str) -> bool {
        self.pull(id)
    }

    /// Flushes the window's final state and releases it. The record stays in
    /// the catalog, marked closed.
    pub fn on_window_closed(&mut self, id: &str) -> bool {
        let snapshot = self.host.snapshot(id);
        let Some(record) = self.catalog.get_mut(id) else {
            self.host.destroy(id);
            log::debug!("close for unknown id={id}");
            return false;
        };
        if let Some(snapshot) = snapshot {
            record.apply_snapshot(&snapshot);
        }
        record.mark_closed();
        self.host.destroy(id);
        log::info!("note closed id={id}");
        true
    }

    /// Recolors the live window, if any, and the record.
    pub fn on_color_changed(&mut self, id: &str, color: NoteColor) -> bool {
        let Some(record) = self.catalog.get_mut(id) else {
            log::debug!("recolor ignored, unknown id={id}");
            return false;
        };
        log::info!("note recolored id={id} color={color}");
        self.host.recolor(id, &color);
        record.color = color;
        true
    }

    /// Pulls every live window into the catalog and clears `is_open` on
    /// records without one.
    pub fn reconcile_all(&mut self) {
        let live = self.host.live_ids();
        for id in &live {
            self.pull(id.as_str());
        }
        for record in self.catalog.iter_mut() {
            if !live.contains(&record.id) {
                record.is_open = false;
            }
        }
    }

    /// Removes the record for good. A live window is dropped first without
    /// flushing its state.
    pub fn delete_record(&mut self, id: &str) -> Option<NoteRecord> {
        if self.host.destroy(id) {
            log::debug!("destroyed window for deleted id={id}");
        }
        let removed = self.catalog.remove(id);
        if removed.is_some() {
            log::info!("note deleted id={id}");
        }
        removed
    }

    /// Replaces the catalog with loaded records and reopens every note that is
    /// or ever was open.
    pub fn restore_session(&mut self, records: Vec<NoteRecord>) -> usize {
        for id in self.host.live_ids() {
            self.host.destroy(id.as_str());
        }
        self.catalog = NoteCatalog::from_records(records);

        let reopen: Vec<NoteRecord> = self
            .catalog
            .iter()
            .filter(|record| record.is_open || record.was_open)
            .cloned()
            .collect();
        self.reconcile_all();

        let count = reopen.len();
        for record in reopen {
            self.create_window(Some(record));
        }
        log::info!(
            "restored {} notes, reopened {count} windows",
            self.catalog.len()
        );
        count
    }

    /// Reconciled view of the catalog, ready to be persisted.
    pub fn prepare_save(&mut self) -> &[NoteRecord] {
        self.reconcile_all();
        self.catalog.records()
    }

    /// Marks every live window as part of the session before shutdown.
    pub fn mark_session_exit(&mut self) {
        for id in self.host.live_ids() {
            if let Some(record) = self.catalog.get_mut(id.as_str()) {
                record.was_open = true;
            }
        }
        self.reconcile_all();
    }

    fn pull(&mut self, id: &str) -> bool {
        let Some(snapshot) = self.host.snapshot(id) else {
            log::debug!("no live window for id={id}");
            return false;
        };
        let Some(record) = self.catalog.get_mut(id) else {
            log::debug!("no record for live window id={id}");
            return false;
        };
        record.apply_snapshot(&snapshot);
        record.mark_open();
        true
    }
}
