// src/dist/mod.rs

//! Distribution model
//!
//! A [`Distribution`] is everything a list file declares about a product:
//! metadata, descriptions, lifecycle commands, dependencies and files. The
//! list-file parser fills it in directive by directive; [`canonical`] then
//! finalizes it (sorted, deduplicated files and a default packager) before
//! package generators read it.
//!
//! Subpackages are referenced by name only. A `None` subpackage means the
//! main package.

pub mod canonical;

use crate::error::{Error, Result};
use crate::version::{MAX_VERSION, MAX_VERSION_NUMBER, MIN_VERSION};
use serde::Serialize;
use std::fmt;

pub use canonical::{default_packager, finalize, sort_and_dedup};

/// Kind of filesystem object a [`File`] installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    File,
    Config,
    Directory,
    Link,
    InitScript,
    Remove,
}

impl FileKind {
    /// Lowercase type character used in list files
    pub fn as_char(&self) -> char {
        match self {
            Self::File => 'f',
            Self::Config => 'c',
            Self::Directory => 'd',
            Self::Link => 'l',
            Self::InitScript => 'i',
            Self::Remove => 'r',
        }
    }

    /// Whether entries of this kind install something from a source path
    pub fn needs_source(&self) -> bool {
        !matches!(self, Self::Directory | Self::Remove)
    }
}

/// Type tag of a list-file entry: a kind plus the patch bit
///
/// Lowercase type characters are regular entries and uppercase ones belong
/// to a patch, except `R`, which is the plain remove marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FileType {
    pub kind: FileKind,
    pub patch: bool,
}

impl FileType {
    /// Parse a list-file type character
    pub fn from_char(c: char) -> Option<Self> {
        let (kind, patch) = match c {
            'f' => (FileKind::File, false),
            'F' => (FileKind::File, true),
            'c' => (FileKind::Config, false),
            'C' => (FileKind::Config, true),
            'd' => (FileKind::Directory, false),
            'D' => (FileKind::Directory, true),
            'l' => (FileKind::Link, false),
            'L' => (FileKind::Link, true),
            'i' => (FileKind::InitScript, false),
            'I' => (FileKind::InitScript, true),
            'R' => (FileKind::Remove, false),
            _ => return None,
        };
        Some(Self { kind, patch })
    }

    /// The type character this tag was parsed from
    pub fn as_char(&self) -> char {
        match (self.kind, self.patch) {
            (FileKind::Remove, _) => 'R',
            (kind, true) => kind.as_char().to_ascii_uppercase(),
            (kind, false) => kind.as_char(),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One filesystem object to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    pub file_type: FileType,
    pub mode: u32,
    pub user: String,
    pub group: String,
    pub dst: String,
    /// Empty for directories and remove markers
    pub src: String,
    /// Free-form per-file options following the source path
    pub options: String,
    pub subpackage: Option<String>,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:04o} {} {} {}",
            self.file_type, self.mode, self.user, self.group, self.dst
        )?;
        if !self.src.is_empty() {
            write!(f, " {}", self.src)?;
        }
        if !self.options.is_empty() {
            write!(f, " {}", self.options)?;
        }
        Ok(())
    }
}

/// Relationship a [`Dependency`] expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    Requires,
    Incompatible,
    Replaces,
    Provides,
}

impl DependencyType {
    /// Directive that declares this relationship
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Requires => "%requires",
            Self::Incompatible => "%incompat",
            Self::Replaces => "%replaces",
            Self::Provides => "%provides",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requires => write!(f, "requires"),
            Self::Incompatible => write!(f, "incompatible-with"),
            Self::Replaces => write!(f, "replaces"),
            Self::Provides => write!(f, "provides"),
        }
    }
}

/// A dependency on another product over an inclusive version range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub dep_type: DependencyType,
    pub product: String,
    /// `[low, high]` version strings
    pub version: [String; 2],
    /// `[low, high]` encoded version numbers
    pub vernumber: [i64; 2],
    pub subpackage: Option<String>,
}

impl Dependency {
    /// A dependency on any version of `product`
    pub fn any_version(dep_type: DependencyType, product: impl Into<String>) -> Self {
        Self {
            dep_type,
            product: product.into(),
            version: [MIN_VERSION.to_string(), MAX_VERSION.to_string()],
            vernumber: [0, MAX_VERSION_NUMBER],
            subpackage: None,
        }
    }

    /// Whether an encoded version falls inside this dependency's range
    pub fn accepts(&self, vernumber: i64) -> bool {
        self.vernumber[0] <= vernumber && vernumber <= self.vernumber[1]
    }

    /// Whether the range has no upper bound
    pub fn is_open_ended(&self) -> bool {
        self.vernumber[1] == MAX_VERSION_NUMBER
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dep_type, self.product)?;
        if self.vernumber[0] > 0 {
            write!(f, " >= {}", self.version[0])?;
        }
        if !self.is_open_ended() {
            write!(f, " <= {}", self.version[1])?;
        }
        Ok(())
    }
}

/// When a lifecycle [`Command`] runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandType {
    PreInstall,
    PostInstall,
    PrePatch,
    PostPatch,
    PreRemove,
    PostRemove,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreInstall => write!(f, "pre-install"),
            Self::PostInstall => write!(f, "post-install"),
            Self::PrePatch => write!(f, "pre-patch"),
            Self::PostPatch => write!(f, "post-patch"),
            Self::PreRemove => write!(f, "pre-remove"),
            Self::PostRemove => write!(f, "post-remove"),
        }
    }
}

/// A lifecycle shell fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    pub command_type: CommandType,
    pub command: String,
    pub subpackage: Option<String>,
}

/// One `%description` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub text: String,
    pub subpackage: Option<String>,
}

/// The software distribution described by a list file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// Product identifier used for package file names
    pub prodname: String,
    /// Human-readable product name from `%product`
    pub product: String,
    pub version: String,
    pub vernumber: i64,
    pub release: String,
    pub copyright: String,
    pub vendor: String,
    pub packager: String,
    pub license: String,
    pub readme: String,
    pub subpackages: Vec<String>,
    pub descriptions: Vec<Description>,
    pub commands: Vec<Command>,
    pub depends: Vec<Dependency>,
    pub files: Vec<File>,
}

impl Distribution {
    /// Create an empty distribution
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subpackage name, keeping first-seen order
    pub fn add_subpackage(&mut self, name: &str) {
        if !self.subpackages.iter().any(|s| s == name) {
            self.subpackages.push(name.to_string());
        }
    }

    /// Descriptions belonging to a subpackage (`None` for the main package)
    pub fn descriptions_for<'a>(
        &'a self,
        subpackage: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Description> + 'a {
        self.descriptions
            .iter()
            .filter(move |d| d.subpackage.as_deref() == subpackage)
    }

    /// Files belonging to a subpackage (`None` for the main package)
    pub fn files_for<'a>(&'a self, subpackage: Option<&'a str>) -> impl Iterator<Item = &'a File> + 'a {
        self.files
            .iter()
            .filter(move |f| f.subpackage.as_deref() == subpackage)
    }

    /// Commands of one lifecycle type, in declaration order
    pub fn commands_of(&self, command_type: CommandType) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(move |c| c.command_type == command_type)
    }

    /// Dependencies of one relationship type, in declaration order
    pub fn depends_of(&self, dep_type: DependencyType) -> impl Iterator<Item = &Dependency> {
        self.depends.iter().filter(move |d| d.dep_type == dep_type)
    }

    /// Check that the distribution has everything a package generator needs
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.product.is_empty() {
            missing.push("%product");
        }
        if self.copyright.is_empty() {
            missing.push("%copyright");
        }
        if self.vendor.is_empty() {
            missing.push("%vendor");
        }
        if self.license.is_empty() && self.readme.is_empty() {
            missing.push("%license or %readme");
        }
        if self.version.is_empty() {
            missing.push("%version");
        }

        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "missing {} in list file",
                missing.join(", ")
            )));
        }

        if self.files.is_empty() {
            return Err(Error::Validation(
                "no files for installation in list file".to_string(),
            ));
        }

        Ok(())
    }
}
