//! Parses lines of the form `<filename>: <hash>, <hash>, ...` into a `Dataset`,
//! a map from each filename to the set of hashes listed for it.
use anyhow::{bail, Context, Result};
use bstr::{BStr, BString, ByteSlice};
use fxhash::FxBuildHasher;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use memchr::memchr;

/// The complaint for a line that doesn't split into a filename and a hash list
pub const FORMAT_COMPLAINT: &str = "expected format is <filename>: [<hashes>, ]";

/// The set of hashes listed for one filename. Insertion order is kept, so
/// hashes are reported in the order they first appear. Hashes are kept as
/// the bytes they were read as, so distinct byte strings stay distinct even
/// when they aren't UTF-8.
pub type Hashes = IndexSet<BString, FxBuildHasher>;

// Filenames keep the position of their first appearance, even when a later
// line replaces their hashes.
type Sets = IndexMap<BString, Hashes, FxBuildHasher>;

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The text before the colon, trimmed
    pub filename: BString,
    /// The trimmed, non-empty, comma-separated tokens after the colon
    pub hashes: Hashes,
}

impl Entry {
    /// Parses `line`, which should look like `<filename>: <hash>, <hash>, ...`.
    /// Returns `Ok(None)` if `line` is empty or all whitespace, and an error if
    /// `line` doesn't contain exactly one colon.
    pub fn parse(line: &[u8]) -> Result<Option<Entry>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(colon) = memchr(b':', line) else { bail!(FORMAT_COMPLAINT) };
        let (filename, hash_list) = (&line[..colon], &line[colon + 1..]);
        if memchr(b':', hash_list).is_some() {
            bail!(FORMAT_COMPLAINT)
        }

        let filename = BString::from(filename.trim());
        let hashes = hash_list
            .trim()
            .split_str(",")
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .map(BString::from)
            .collect();
        Ok(Some(Entry { filename, hashes }))
    }
}

/// A `Dataset` maps each filename to its set of hashes. If a filename occurs
/// more than once, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    sets: Sets,
}

impl Dataset {
    /// Parses every line of `text`. Blank lines are skipped; the first
    /// malformed line ends parsing with an error naming its line number.
    pub fn from_text(text: &[u8]) -> Result<Dataset> {
        let mut dataset = Dataset::default();
        for (index, line) in text.lines().enumerate() {
            let entry = Entry::parse(line).with_context(|| format!("Line {} is malformed", index + 1))?;
            if let Some(entry) = entry {
                dataset.insert(entry);
            }
        }
        Ok(dataset)
    }

    /// Inserts `entry`, returning the hashes it replaced, if any
    pub fn insert(&mut self, entry: Entry) -> Option<Hashes> {
        let Entry { filename, hashes } = entry;
        if self.sets.contains_key(&filename) {
            debug!("{filename} appears more than once, keeping its last line");
        }
        self.sets.insert(filename, hashes)
    }

    /// The hashes for `filename`
    pub fn get(&self, filename: impl AsRef<[u8]>) -> Option<&Hashes> {
        self.sets.get(filename.as_ref())
    }

    /// The number of distinct filenames
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True if no line named a filename
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// The filenames, in order of first appearance
    pub fn names(&self) -> impl Iterator<Item = &BStr> {
        self.sets.keys().map(|name| name.as_bstr())
    }

    /// `(filename, hashes)` pairs, in order of the filename's first appearance
    pub fn iter(&self) -> impl Iterator<Item = (&BStr, &Hashes)> {
        self.sets.iter().map(|(name, hashes)| (name.as_bstr(), hashes))
    }
}
