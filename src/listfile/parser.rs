// src/listfile/parser.rs

//! Directive dispatcher and parse entry points
//!
//! Logical lines from the [`ConditionalReader`] stack are variable-expanded
//! and routed by their first word:
//!
//! - `$NAME=value` lines set an environment default
//! - `%`-directives set metadata, collect descriptions, commands and
//!   dependencies, select a subpackage, or open an `%include`
//! - everything else must be a file entry:
//!   `<type><mode> <user> <group> <dst> <src> [options]`
//!
//! Recoverable problems become diagnostics and the offending line is
//! skipped. Only a primary list file that cannot be opened, a read error,
//! or an include chain deeper than [`MAX_INCLUDE_DEPTH`] abort the parse.

use super::conditional::{ConditionalReader, ConditionalState, LogicalLine, Target};
use super::depend::parse_dependency;
use super::diag::{Diagnostic, Diagnostics};
use super::expand::{parse_assignment, Environment};
use super::glob;
use crate::dist::{self, Command, CommandType, DependencyType, Description, Distribution, File, FileKind, FileType};
use crate::error::{Error, Result, MAX_INCLUDE_DEPTH};
use crate::platform::{PackageFormat, Platform};
use crate::version::version_to_number;
use std::fs;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

type Stream = ConditionalReader<Box<dyn BufRead>>;

/// Everything a parse needs besides the list file itself
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub platform: Platform,
    pub format: PackageFormat,
    /// Effective environment; list-file defaults never override it
    pub env: Environment,
    /// Product identifier; defaults to the list file's stem
    pub prodname: Option<String>,
}

impl ParseOptions {
    /// Options for a target, with the environment taken from the process
    pub fn new(platform: Platform, format: PackageFormat) -> Self {
        Self {
            platform,
            format,
            env: Environment::from_os(),
            prodname: None,
        }
    }

    /// Replace the effective environment
    pub fn with_env(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Set one variable, taking precedence over list-file defaults
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.env.set(name, value);
        self
    }

    pub fn with_prodname(mut self, prodname: impl Into<String>) -> Self {
        self.prodname = Some(prodname.into());
        self
    }
}

/// Result of a successful parse
#[derive(Debug)]
pub struct ParseOutput {
    pub dist: Distribution,
    pub diagnostics: Vec<Diagnostic>,
    /// Effective environment after all `$NAME=value` defaults were applied
    pub env: Environment,
}

/// Parse a list file for a target platform and package format
pub fn parse(path: &Path, platform: &Platform, format: PackageFormat) -> Result<Distribution> {
    let options = ParseOptions::new(platform.clone(), format);
    Ok(parse_with_options(path, &options)?.dist)
}

/// Parse a list file with explicit options
pub fn parse_with_options(path: &Path, options: &ParseOptions) -> Result<ParseOutput> {
    let file = fs::File::open(path).map_err(|source| Error::ListFileOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let stream: Stream = ConditionalReader::new(Box::new(BufReader::new(file)), path);
    ListParser::new(options, stream).run()
}

/// Parse list-file text held in memory
///
/// `name` is used for diagnostics and the default product identifier.
/// Includes and wildcard sources are still resolved on the filesystem.
pub fn parse_str(content: &str, name: &str, options: &ParseOptions) -> Result<ParseOutput> {
    let stream: Stream = ConditionalReader::new(Box::new(Cursor::new(content.to_string())), name);
    ListParser::new(options, stream).run()
}

struct ListParser<'a> {
    platform: &'a Platform,
    format: PackageFormat,
    prodname: Option<&'a str>,
    primary: PathBuf,
    env: Environment,
    state: ConditionalState,
    stack: Vec<Stream>,
    diags: Diagnostics,
    dist: Distribution,
    subpackage: Option<String>,
}

impl<'a> ListParser<'a> {
    fn new(options: &'a ParseOptions, primary: Stream) -> Self {
        Self {
            platform: &options.platform,
            format: options.format,
            prodname: options.prodname.as_deref(),
            primary: primary.path().to_path_buf(),
            env: options.env.clone(),
            state: ConditionalState::default(),
            stack: vec![primary],
            diags: Diagnostics::new(),
            dist: Distribution::new(),
            subpackage: None,
        }
    }

    fn run(mut self) -> Result<ParseOutput> {
        self.dist.prodname = match self.prodname {
            Some(name) => {
                if name.is_empty() || !name.chars().all(char::is_alphanumeric) {
                    return Err(Error::InvalidProductName(name.to_string()));
                }
                name.to_string()
            }
            None => self
                .primary
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        info!(
            "Reading {} for {} ({})",
            self.primary.display(),
            self.platform,
            self.format
        );

        while let Some(reader) = self.stack.last_mut() {
            let target = Target {
                platform: self.platform,
                format: self.format,
                env: &self.env,
            };

            match reader.next_line(&mut self.state, &target, &mut self.diags)? {
                Some(line) => self.process(line)?,
                None => {
                    if let Some(done) = self.stack.pop() {
                        debug!("Finished {}", done.path().display());
                    }
                }
            }
        }

        if self.state.in_if_block() {
            self.diags.warn(&self.primary, 0, "Missing %endif at end of list file");
        }

        dist::finalize(&mut self.dist);

        info!(
            "Read {} files, {} dependencies, {} commands ({} warnings)",
            self.dist.files.len(),
            self.dist.depends.len(),
            self.dist.commands.len(),
            self.diags.len()
        );

        Ok(ParseOutput {
            dist: self.dist,
            diagnostics: self.diags.into_vec(),
            env: self.env,
        })
    }

    fn process(&mut self, line: LogicalLine) -> Result<()> {
        if let Some((name, value)) = parse_assignment(&line.text) {
            let value = self.env.expand(value);
            if self.env.set_default(name, value) {
                debug!("Defined ${} from list file", name);
            } else {
                debug!("${} already set, keeping existing value", name);
            }
            return Ok(());
        }

        let text = self.env.expand(&line.text);
        if text.starts_with('%') {
            self.directive(&text, line.line)
        } else {
            self.file_entry(&text, line.line);
            Ok(())
        }
    }

    fn directive(&mut self, text: &str, line: usize) -> Result<()> {
        let (directive, value) = match text.split_once(char::is_whitespace) {
            Some((d, rest)) => (d, rest.trim()),
            None => (text, ""),
        };

        debug!("{} {}", directive, value);

        match directive {
            "%include" => self.include(value, line)?,
            "%product" => self.set_once(directive, value, line, |d| &mut d.product),
            "%copyright" => self.set_once(directive, value, line, |d| &mut d.copyright),
            "%vendor" => self.set_once(directive, value, line, |d| &mut d.vendor),
            "%packager" => self.set_once(directive, value, line, |d| &mut d.packager),
            "%license" => self.set_once(directive, value, line, |d| &mut d.license),
            "%readme" => self.set_once(directive, value, line, |d| &mut d.readme),
            "%version" => self.version(value, line),
            "%release" => self.release(value, line),
            "%subpackage" => self.select_subpackage(value),
            "%description" => {
                if let Some(text) = self.block_value(directive, value, line)? {
                    self.dist.descriptions.push(Description {
                        text,
                        subpackage: self.subpackage.clone(),
                    });
                }
            }
            "%requires" => self.dependency(DependencyType::Requires, value, line),
            "%incompat" => self.dependency(DependencyType::Incompatible, value, line),
            "%replaces" => self.dependency(DependencyType::Replaces, value, line),
            "%provides" => self.dependency(DependencyType::Provides, value, line),
            _ => match command_type(directive) {
                Some(command_type) => {
                    if let Some(command) = self.block_value(directive, value, line)? {
                        self.dist.commands.push(Command {
                            command_type,
                            command,
                            subpackage: self.subpackage.clone(),
                        });
                    }
                }
                None => self.warn(line, format!("Unknown directive \"{}\" ignored", directive)),
            },
        }

        Ok(())
    }

    fn include(&mut self, value: &str, line: usize) -> Result<()> {
        if value.is_empty() {
            self.warn(line, "Missing file name for %include");
            return Ok(());
        }

        let path = PathBuf::from(value);
        if self.stack.len() >= MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeDepthExceeded {
                path,
                depth: MAX_INCLUDE_DEPTH,
            });
        }

        match fs::File::open(&path) {
            Ok(file) => {
                debug!("Including {}", path.display());
                self.stack
                    .push(ConditionalReader::new(Box::new(BufReader::new(file)), path));
            }
            Err(e) => self.warn(line, format!("Unable to include \"{}\": {}", value, e)),
        }
        Ok(())
    }

    fn set_once(
        &mut self,
        directive: &str,
        value: &str,
        line: usize,
        field: fn(&mut Distribution) -> &mut String,
    ) {
        if value.is_empty() {
            self.warn(line, format!("Missing value for {}", directive));
            return;
        }

        let slot = field(&mut self.dist);
        if slot.is_empty() {
            *slot = value.to_string();
        } else {
            self.warn(line, format!("Ignoring {} line in list file", directive));
        }
    }

    fn version(&mut self, value: &str, line: usize) {
        if !self.dist.version.is_empty() {
            self.warn(line, "Ignoring %version line in list file");
            return;
        }

        let mut tokens = value.split_whitespace();
        let Some(version) = tokens.next() else {
            self.warn(line, "Missing value for %version");
            return;
        };

        let version = match version.rsplit_once('-') {
            Some((version, release)) if !release.is_empty() => {
                self.dist.release = release.to_string();
                version
            }
            _ => version,
        };

        self.dist.version = version.to_string();
        self.dist.vernumber = match tokens.next() {
            Some(number) => match number.parse::<i64>() {
                Ok(n) => n,
                Err(_) => {
                    self.warn(line, format!("Bad version number \"{}\", deriving from version", number));
                    version_to_number(version)
                }
            },
            None => version_to_number(version),
        };
    }

    fn release(&mut self, value: &str, line: usize) {
        let Some(release) = value.split_whitespace().next() else {
            self.warn(line, "Missing value for %release");
            return;
        };

        if !self.dist.release.is_empty() {
            self.warn(line, "Ignoring %release line in list file");
            return;
        }
        if !release.bytes().all(|b| b.is_ascii_digit()) {
            self.warn(line, format!("Release \"{}\" is not a number", release));
        }
        self.dist.release = release.to_string();
    }

    fn select_subpackage(&mut self, value: &str) {
        if value.is_empty() {
            self.subpackage = None;
        } else {
            self.dist.add_subpackage(value);
            self.subpackage = Some(value.to_string());
        }
    }

    fn dependency(&mut self, dep_type: DependencyType, value: &str, line: usize) {
        match parse_dependency(dep_type, value) {
            Some(mut dep) => {
                dep.subpackage = self.subpackage.clone();
                self.dist.depends.push(dep);
            }
            None => self.warn(line, format!("Missing product name for {}", dep_type.directive())),
        }
    }

    /// Resolve a directive value that may be an inline or file-sourced block
    fn block_value(&mut self, directive: &str, value: &str, line: usize) -> Result<Option<String>> {
        if let Some(terminator) = value.strip_prefix("<<") {
            let terminator = terminator.trim();
            if terminator.is_empty() {
                self.warn(line, format!("Missing terminator for inline {}", directive));
                return Ok(None);
            }
            return self.inline_block(directive, terminator, line).map(Some);
        }

        if let Some(path) = value.strip_prefix('<') {
            if !path.is_empty() && !path.starts_with(char::is_whitespace) {
                return Ok(match fs::read_to_string(path) {
                    Ok(mut text) => {
                        if text.ends_with('\n') {
                            text.pop();
                        }
                        Some(text)
                    }
                    Err(e) => {
                        self.warn(line, format!("Unable to read \"{}\" for {}: {}", path, directive, e));
                        None
                    }
                });
            }
        }

        if value.is_empty() {
            self.warn(line, format!("Missing value for {}", directive));
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    fn inline_block(&mut self, directive: &str, terminator: &str, line: usize) -> Result<String> {
        let mut lines = Vec::new();
        let mut terminated = false;

        if let Some(reader) = self.stack.last_mut() {
            while let Some(raw) = reader.read_raw_line()? {
                if raw == terminator {
                    terminated = true;
                    break;
                }
                lines.push(raw);
            }
        }

        if !terminated {
            self.warn(
                line,
                format!("Missing \"{}\" terminator for inline {}", terminator, directive),
            );
        }
        Ok(lines.join("\n"))
    }

    fn file_entry(&mut self, text: &str, line: usize) {
        let Some(type_char) = text.chars().next() else {
            return;
        };
        let Some(file_type) = FileType::from_char(type_char) else {
            self.warn(line, format!("Bad line - {}", text));
            return;
        };

        let mut rest = &text[type_char.len_utf8()..];
        let mode = next_token(&mut rest);
        let user = next_token(&mut rest);
        let group = next_token(&mut rest);
        let dst = next_token(&mut rest);
        let src = next_token(&mut rest);
        let options = rest.trim();

        let (Some(mode), Some(user), Some(group), Some(dst)) = (mode, user, group, dst) else {
            self.warn(line, format!("Bad line - {}", text));
            return;
        };

        let Ok(mode) = u32::from_str_radix(mode, 8) else {
            self.warn(line, format!("Bad file mode \"{}\" - {}", mode, text));
            return;
        };

        let src = if file_type.kind.needs_source() {
            match src {
                Some(src) => src,
                None => {
                    self.warn(line, format!("Missing source path - {}", text));
                    return;
                }
            }
        } else {
            ""
        };

        let group = match self.platform.sys_group() {
            Some(mapped) if group == "sys" => mapped,
            _ => group,
        };

        let file = File {
            file_type,
            mode,
            user: user.to_string(),
            group: group.to_string(),
            dst: dst.to_string(),
            src: src.to_string(),
            options: options.to_string(),
            subpackage: self.subpackage.clone(),
        };

        let wildcard = glob::is_pattern(split_source(src).1);

        if wildcard && matches!(file.file_type.kind, FileKind::File | FileKind::Config | FileKind::InitScript) {
            self.expand_wildcard(file, line);
        } else {
            self.dist.files.push(file);
        }
    }

    /// Add one file per directory entry matching the source pattern
    fn expand_wildcard(&mut self, template: File, line: usize) {
        let (dir, pattern) = split_source(&template.src);
        let (dir, pattern) = (dir.to_string(), pattern.to_string());

        let mut dst_dir = template.dst.clone();
        if !dst_dir.ends_with('/') {
            dst_dir.push('/');
        }

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut matched = 0;
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.warn(line, format!("Unable to read directory \"{}\": {}", dir, e));
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !glob::matches(&name, &pattern) {
                continue;
            }

            let src = if dir.ends_with('/') {
                format!("{}{}", dir, name)
            } else {
                format!("{}/{}", dir, name)
            };

            self.dist.files.push(File {
                src,
                dst: format!("{}{}", dst_dir, name),
                ..template.clone()
            });
            matched += 1;
        }

        debug!("{}/{} matched {} files", dir, pattern, matched);
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        let path = self
            .stack
            .last()
            .map(|s| s.path().to_path_buf())
            .unwrap_or_else(|| self.primary.clone());
        self.diags.warn(&path, line, message);
    }
}

/// Map a lifecycle directive to its command type
fn command_type(directive: &str) -> Option<CommandType> {
    match directive {
        "%preinstall" => Some(CommandType::PreInstall),
        "%install" | "%postinstall" => Some(CommandType::PostInstall),
        "%prepatch" => Some(CommandType::PrePatch),
        "%patch" | "%postpatch" => Some(CommandType::PostPatch),
        "%preremove" | "%remove" => Some(CommandType::PreRemove),
        "%postremove" => Some(CommandType::PostRemove),
        _ => None,
    }
}

/// Split a source path into the directory to read and its last segment
///
/// A source without a directory part is read from `.`.
fn split_source(src: &str) -> (&str, &str) {
    match src.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((dir, name)) => (dir, name),
        None => (".", src),
    }
}

/// Split off the next whitespace-delimited token
fn next_token<'t>(rest: &mut &'t str) -> Option<&'t str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        *rest = trimmed;
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ParseOptions {
        ParseOptions::new(Platform::new("Linux", "6.1.0", "x86_64"), PackageFormat::Rpm)
            .with_env(Environment::empty())
    }

    fn parse_text(content: &str) -> ParseOutput {
        parse_str(content, "test.list", &options()).unwrap()
    }

    #[test]
    fn test_next_token() {
        let mut rest = " 0644  root sys /a";
        assert_eq!(next_token(&mut rest), Some("0644"));
        assert_eq!(next_token(&mut rest), Some("root"));
        assert_eq!(next_token(&mut rest), Some("sys"));
        assert_eq!(next_token(&mut rest), Some("/a"));
        assert_eq!(next_token(&mut rest), None);
    }

    #[test]
    fn test_split_source() {
        assert_eq!(split_source("*.so"), (".", "*.so"));
        assert_eq!(split_source("/x*"), ("/", "x*"));
        assert_eq!(split_source("build/lib/lib*.so"), ("build/lib", "lib*.so"));
        assert_eq!(split_source("src/app"), ("src", "app"));
    }

    #[test]
    fn test_wildcard_without_directory_reads_cwd() {
        // the working directory of the test runner is the package root
        let dist = parse_text("f 0644 root sys /usr/share/packlist/ Cargo.t?ml\n").dist;
        assert_eq!(dist.files.len(), 1);
        assert_eq!(dist.files[0].src, "./Cargo.toml");
        assert_eq!(dist.files[0].dst, "/usr/share/packlist/Cargo.toml");
    }

    #[test]
    fn test_system_name_prefix() {
        let out = parse_text("%system lin\nf 0644 root root /a a\n%system sol\nf 0644 root root /b b\n");
        assert_eq!(out.dist.files.len(), 1);
        assert_eq!(out.dist.files[0].dst, "/a");
    }

    #[test]
    fn test_dependency_warning_names_directive() {
        let out = parse_text("%incompat\n");
        assert!(out.diagnostics[0].message.contains("%incompat"));
    }

    #[test]
    fn test_command_aliases() {
        assert_eq!(command_type("%install"), Some(CommandType::PostInstall));
        assert_eq!(command_type("%remove"), Some(CommandType::PreRemove));
        assert_eq!(command_type("%patch"), Some(CommandType::PostPatch));
        assert_eq!(command_type("%postremove"), Some(CommandType::PostRemove));
        assert_eq!(command_type("%product"), None);
    }

    #[test]
    fn test_end_to_end_minimal() {
        let out = parse_text("%product Test\n%version 1.0 100\n%vendor ACME\nf 0644 root root /opt/test/bin/app app\n");
        let dist = out.dist;
        assert_eq!(dist.product, "Test");
        assert_eq!(dist.vernumber, 100);
        assert_eq!(dist.vendor, "ACME");
        assert_eq!(dist.files.len(), 1);
        assert_eq!(dist.files[0].dst, "/opt/test/bin/app");
        assert_eq!(dist.files[0].src, "app");
        assert_eq!(dist.files[0].mode, 0o644);
        assert_eq!(dist.prodname, "test");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_metadata_first_wins() {
        let out = parse_text("%vendor First\n%vendor Second\n");
        assert_eq!(out.dist.vendor, "First");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("Ignoring %vendor"));
        assert_eq!(out.diagnostics[0].line, 2);
    }

    #[test]
    fn test_version_derives_number_and_release() {
        let dist = parse_text("%version 2.1b3-4\n").dist;
        assert_eq!(dist.version, "2.1b3");
        assert_eq!(dist.release, "4");
        assert_eq!(dist.vernumber, version_to_number("2.1b3"));
    }

    #[test]
    fn test_version_release_is_trailing_suffix() {
        let dist = parse_text("%version 1.0-beta-3\n").dist;
        assert_eq!(dist.version, "1.0-beta");
        assert_eq!(dist.release, "3");
    }

    #[test]
    fn test_release_not_overridden() {
        let dist = parse_text("%version 1.0-2\n%release 7\n").dist;
        assert_eq!(dist.release, "2");

        let dist = parse_text("%version 1.0\n%release 7\n").dist;
        assert_eq!(dist.release, "7");
    }

    #[test]
    fn test_release_defaults_to_zero() {
        assert_eq!(parse_text("%version 1.0\n").dist.release, "0");
    }

    #[test]
    fn test_unknown_directive_is_diagnostic() {
        let out = parse_text("%bogus value\n%product Still\n");
        assert_eq!(out.dist.product, "Still");
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("%bogus"));
    }

    #[test]
    fn test_bad_file_lines() {
        let out = parse_text("x 0644 root root /a a\nf 0999 root root /b b\nf 0644 root\nf 0644 root root /c\nf 0644 root root /d d\n");
        assert_eq!(out.dist.files.len(), 1);
        assert_eq!(out.dist.files[0].dst, "/d");
        assert_eq!(out.diagnostics.len(), 4);
    }

    #[test]
    fn test_directory_and_remove_without_source() {
        let dist = parse_text("d 0755 root sys /opt/app -\nR 0644 root sys /etc/old.conf\n").dist;
        assert_eq!(dist.files.len(), 2);
        assert!(dist.files.iter().all(|f| f.src.is_empty()));
        assert_eq!(dist.files[0].file_type.kind, FileKind::Remove);
        assert_eq!(dist.files[1].file_type.kind, FileKind::Directory);
    }

    #[test]
    fn test_type_char_attached_to_mode() {
        let dist = parse_text("c0600 root root /etc/app.conf app.conf\n").dist;
        assert_eq!(dist.files[0].file_type.kind, FileKind::Config);
        assert_eq!(dist.files[0].mode, 0o600);
    }

    #[test]
    fn test_sys_group_remap() {
        let dist = parse_text("f 0644 root sys /a a\n").dist;
        assert_eq!(dist.files[0].group, "root");

        let aix = ParseOptions::new(Platform::new("AIX", "5", "powerpc"), PackageFormat::Aix)
            .with_env(Environment::empty());
        let dist = parse_str("f 0644 root sys /a a\n", "x", &aix).unwrap().dist;
        assert_eq!(dist.files[0].group, "sys");
    }

    #[test]
    fn test_file_options_kept() {
        let dist = parse_text("f 0755 root sys /usr/bin/app app nostrip() mode(0755)\n").dist;
        assert_eq!(dist.files[0].options, "nostrip() mode(0755)");
    }

    #[test]
    fn test_inline_description() {
        let out = parse_text("%description <<EOF\nLine one\n# not a comment\n  indented\nEOF\n%product After\n");
        assert_eq!(out.dist.descriptions.len(), 1);
        assert_eq!(out.dist.descriptions[0].text, "Line one\n# not a comment\n  indented");
        assert_eq!(out.dist.product, "After");
    }

    #[test]
    fn test_inline_block_without_terminator() {
        let out = parse_text("%postinstall <<END\necho hi\n");
        assert_eq!(out.dist.commands[0].command, "echo hi");
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_commands_in_order() {
        let dist = parse_text("%preinstall echo pre\n%install echo post\n%postinstall echo post2\n%remove echo rm\n").dist;
        let types: Vec<CommandType> = dist.commands.iter().map(|c| c.command_type).collect();
        assert_eq!(
            types,
            vec![
                CommandType::PreInstall,
                CommandType::PostInstall,
                CommandType::PostInstall,
                CommandType::PreRemove
            ]
        );
        assert_eq!(dist.commands_of(CommandType::PostInstall).count(), 2);
    }

    #[test]
    fn test_dependencies() {
        let dist = parse_text("%requires foo\n%incompat bar 1.0 2.0\n%requires\n").dist;
        assert_eq!(dist.depends.len(), 2);
        assert_eq!(dist.depends[0].vernumber, [0, i64::MAX]);
        assert_eq!(dist.depends[1].dep_type, DependencyType::Incompatible);
    }

    #[test]
    fn test_subpackages_tag_entries() {
        let dist = parse_text(
            "%description Main\nf 0644 root sys /a a\n%subpackage devel\n%description Headers\n%requires libfoo\nf 0644 root sys /b.h b.h\n%postinstall echo devel\n%subpackage\nf 0644 root sys /c c\n",
        )
        .dist;

        assert_eq!(dist.subpackages, vec!["devel".to_string()]);
        assert_eq!(dist.descriptions[0].subpackage, None);
        assert_eq!(dist.descriptions[1].subpackage.as_deref(), Some("devel"));
        assert_eq!(dist.depends[0].subpackage.as_deref(), Some("devel"));
        assert_eq!(dist.commands[0].subpackage.as_deref(), Some("devel"));
        assert_eq!(dist.files_for(Some("devel")).count(), 1);
        assert_eq!(dist.files_for(None).count(), 2);
    }

    #[test]
    fn test_variables_expand_in_lines() {
        let out = parse_str(
            "$prefix=/opt/app\nf 0755 root sys ${prefix}/bin/app app\n%product $(NAME) Suite\n",
            "x",
            &options().with_var("NAME", "Demo"),
        )
        .unwrap();
        assert_eq!(out.dist.files[0].dst, "/opt/app/bin/app");
        assert_eq!(out.dist.product, "Demo Suite");
        assert_eq!(out.env.get("prefix"), Some("/opt/app"));
    }

    #[test]
    fn test_environment_precedence() {
        let out = parse_str("$FOO=list-default\n", "x", &options().with_var("FOO", "cli-value")).unwrap();
        assert_eq!(out.env.get("FOO"), Some("cli-value"));
    }

    #[test]
    fn test_assignment_then_if() {
        let dist = parse_text("$WITH_DOCS=1\n%if WITH_DOCS\n%readme README\n%endif\n").dist;
        assert_eq!(dist.readme, "README");
    }

    #[test]
    fn test_dollar_escape_in_command() {
        let dist = parse_text("%postinstall echo $$HOME\n").dist;
        assert_eq!(dist.commands[0].command, "echo $HOME");
    }

    #[test]
    fn test_missing_endif_warns() {
        let out = parse_text("%ifdef NOPE\n%product Hidden\n");
        assert!(out.dist.product.is_empty());
        assert!(out.diagnostics.iter().any(|d| d.message.contains("Missing %endif")));
    }

    #[test]
    fn test_invalid_prodname() {
        let opts = options().with_prodname("bad-name");
        assert!(matches!(
            parse_str("", "x", &opts),
            Err(Error::InvalidProductName(_))
        ));
    }

    #[test]
    fn test_files_sorted_after_parse() {
        let dist = parse_text("f 0644 root sys /z z\nf 0644 root sys /a a\nf 0644 root sys /z z2\n").dist;
        let dsts: Vec<&str> = dist.files.iter().map(|f| f.dst.as_str()).collect();
        assert_eq!(dsts, vec!["/a", "/z"]);
        assert_eq!(dist.files[1].src, "z2");
    }
}
