use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, warn};

use super::{record::Student, tree::Tree, Result};

/// Record store keyed by student id.
///
/// Wraps the search tree and owns persistence. Lookups hand out
/// references tied to the store borrow; re-keying a record means remove
/// plus reinsert.
pub struct StudentStore {
    tree: Tree,
}

impl StudentStore {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// Inserts a new record. Fails with
    /// [StoreError::DuplicateId](super::StoreError::DuplicateId) if the
    /// id is taken; update existing records through [find_mut](Self::find_mut).
    pub fn insert(&mut self, student: Student) -> Result<()> {
        self.tree.insert(student)
    }

    pub fn find(&self, id: i32) -> Option<&Student> {
        self.tree.find(id)
    }

    pub fn find_mut(&mut self, id: i32) -> Option<&mut Student> {
        self.tree.find_mut(id)
    }

    /// Removes the record with this id, returning it if it existed.
    pub fn remove(&mut self, id: i32) -> Option<Student> {
        self.tree.remove(id)
    }

    /// All records in ascending id order.
    pub fn in_key_order(&self) -> Vec<&Student> {
        self.tree.in_key_order()
    }

    /// All records by grade, highest first. Equal grades keep ascending
    /// id order (stable sort over the key-ordered snapshot).
    pub fn by_grade_desc(&self) -> Vec<&Student> {
        let mut records = self.tree.in_key_order();
        records.sort_by(|a, b| b.grade.partial_cmp(&a.grade).unwrap_or(Ordering::Equal));
        records
    }

    /// Encodes every record onto the sink, in pre-order over the current
    /// tree shape. A write failure aborts the save and propagates; the
    /// sink may then hold a truncated tail record.
    pub fn save_to<W: Write>(&self, out: &mut W) -> Result<()> {
        for record in self.tree.pre_order() {
            record.write_to(out)?;
        }
        Ok(())
    }

    /// Decodes records from the source and inserts each until the source
    /// is exhausted. Best effort: a truncated or unreadable tail stops
    /// loading but keeps everything decoded so far, and a duplicate id in
    /// the stream is skipped. Returns the number of records loaded.
    pub fn load_from<R: Read>(&mut self, input: &mut R) -> usize {
        let mut loaded = 0;

        loop {
            match Student::read_from(input) {
                Ok(Some(student)) => {
                    let id = student.id();
                    match self.insert(student) {
                        Ok(()) => loaded += 1,
                        Err(e) => warn!("skipping record {id}; {e}"),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("stopping load; {e}");
                    break;
                }
            }
        }

        loaded
    }

    /// Writes the whole store to a file, replacing its contents.
    pub fn save_file(&self, path: &Path) -> Result<()> {
        let out = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let mut writer = BufWriter::new(out);

        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Loads records from a file. A file that is missing or unreadable
    /// means starting fresh, not an error.
    pub fn load_file(&mut self, path: &Path) -> usize {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!("no data file at {}; {e}", path.display());
                return 0;
            }
        };

        self.load_from(&mut BufReader::new(file))
    }
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::new()
    }
}
