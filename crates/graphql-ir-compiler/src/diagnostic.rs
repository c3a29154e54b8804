//! Issues produced by schema assembly and document validation,
//! and their pretty-printed form.
//!
//! Every issue has a [`Severity`]: errors block compilation, warnings are advisory.
//! Whether some kinds of issues are errors or warnings is configured with [`IssueSeverities`].
//!
//! ```rust
//! use graphql_ir_compiler::Schema;
//!
//! let input = "type Query { a: Int } type Query { b: Int }";
//! let result = Schema::parse_and_validate(input, "schema.graphql");
//! assert!(result.value.is_none());
//! // Display formatting prints labeled source code without colors
//! println!("{}", result.issues);
//! ```
use crate::parser::LineColumn;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::NodeLocation;
use crate::SourceFile;
use crate::SourceMap;
use ariadne::ColorGenerator;
use ariadne::ReportKind;
use std::fmt;
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

/// The category of an [`Issue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IssueKind {
    /// The document or schema breaks a GraphQL or Apollo validation rule
    ValidationError,
    /// The source text is not valid GraphQL syntax
    ParsingError,
    /// A deprecated field, argument, input field or enum value is used
    DeprecatedUsage,
    /// An operation declares a variable it never uses
    UnusedVariable,
    /// A directive without a definition is used
    UnknownDirective,
    /// A field or alias starts with an uppercase letter, which clashes with model names
    UpperCaseField,
    /// Two fields with the same response name, selected on disjoint object types,
    /// have different response shapes
    DifferentShape,
    /// A user definition replaces one of the directives that are added automatically
    DirectiveRedefinition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Chooses the severity of the issue kinds that can be either warnings or errors.
///
/// Every other kind is always an error, except [`IssueKind::DirectiveRedefinition`]
/// which is always a warning.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IssueSeverities {
    pub unknown_directive: Severity,
    pub deprecated_usage: Severity,
    pub unused_variable: Severity,
    pub different_shape: Severity,
}

impl Default for IssueSeverities {
    fn default() -> Self {
        Self {
            unknown_directive: Severity::Warning,
            deprecated_usage: Severity::Warning,
            unused_variable: Severity::Warning,
            different_shape: Severity::Error,
        }
    }
}

impl IssueSeverities {
    /// Make every configurable kind an error
    pub fn all_errors() -> Self {
        Self {
            unknown_directive: Severity::Error,
            deprecated_usage: Severity::Error,
            unused_variable: Severity::Error,
            different_shape: Severity::Error,
        }
    }

    pub fn unknown_directive(mut self, severity: Severity) -> Self {
        self.unknown_directive = severity;
        self
    }

    pub fn deprecated_usage(mut self, severity: Severity) -> Self {
        self.deprecated_usage = severity;
        self
    }

    pub fn unused_variable(mut self, severity: Severity) -> Self {
        self.unused_variable = severity;
        self
    }

    pub fn different_shape(mut self, severity: Severity) -> Self {
        self.different_shape = severity;
        self
    }

    pub fn severity_of(&self, kind: IssueKind) -> Severity {
        match kind {
            IssueKind::UnknownDirective => self.unknown_directive,
            IssueKind::DeprecatedUsage => self.deprecated_usage,
            IssueKind::UnusedVariable => self.unused_variable,
            IssueKind::DifferentShape => self.different_shape,
            IssueKind::DirectiveRedefinition => Severity::Warning,
            IssueKind::ValidationError | IssueKind::ParsingError | IssueKind::UpperCaseField => {
                Severity::Error
            }
        }
    }
}

/// Line, column and file of an issue, ready for display to users
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub path: Option<PathBuf>,
}

/// A diagnostic record
#[derive(Clone)]
pub struct Issue {
    pub kind: IssueKind,
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
    /// The byte range this issue points to, for pretty-printing
    pub span: Option<NodeLocation>,
    pub(crate) data: Box<DiagnosticData>,
}

/// An ordered, append-only list of issues, together with the source files they refer to
#[derive(Clone)]
pub struct DiagnosticList {
    pub(crate) sources: SourceMap,
    issues: Vec<Issue>,
    severities: IssueSeverities,
}

/// Outcome of an entry point: a value, only present if no error-severity issue was produced,
/// and every issue including warnings.
#[derive(Debug, Clone)]
pub struct CompileResult<T> {
    pub value: Option<T>,
    pub issues: DiagnosticList,
}

impl<T> CompileResult<T> {
    /// Returns the value, or all issues if there is at least one error
    pub fn into_result(self) -> Result<T, DiagnosticList> {
        self.value.ok_or(self.issues)
    }

    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Produce the pretty-printed report for this issue.
    fn report(&self, sources: &SourceMap, color: Color) -> CliReport {
        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };
        let mut report = CliReport::builder(sources.clone(), kind, self.span).with_color(color);
        report.with_message(&self.message);
        self.data.report(self.span, &mut report);
        report
    }
}

impl fmt::Debug for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issue")
            .field("kind", &self.kind)
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("location", &self.location)
            .finish()
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            if let Some(path) = &location.path {
                write!(f, "{}:", path.display())?;
            }
            write!(f, "{}:{}: ", location.line, location.column)?;
        }
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{severity}: {}", self.message)
    }
}

impl DiagnosticList {
    /// Creates an empty diagnostic list with the given source map.
    pub fn new(sources: SourceMap) -> Self {
        Self {
            sources,
            issues: Vec::new(),
            severities: IssueSeverities::default(),
        }
    }

    pub(crate) fn with_severities(mut self, severities: IssueSeverities) -> Self {
        self.severities = severities;
        self
    }

    pub(crate) fn push(&mut self, location: Option<NodeLocation>, data: impl Into<DiagnosticData>) {
        let data = data.into();
        let kind = data.kind();
        let severity = self.severities.severity_of(kind);
        let location_for_users = location.and_then(|location| {
            let source = self.sources.get(&location.file_id())?;
            let LineColumn { line, column } = source.get_line_column(location.offset())?;
            Some(SourceLocation {
                line,
                column,
                path: Some(source.path().to_owned()),
            })
        });
        self.issues.push(Issue {
            kind,
            severity,
            message: data.to_string(),
            location: location_for_users,
            span: location,
            data: Box::new(data),
        })
    }

    /// Add the issues and source files of another list at the end of this one
    pub fn merge(&mut self, other: DiagnosticList) {
        let sources = Arc::make_mut(&mut self.sources);
        for (file_id, source) in other.sources.iter() {
            sources.entry(*file_id).or_insert_with(|| source.clone());
        }
        self.issues.extend(other.issues)
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Issue> + ExactSizeIterator {
        self.issues.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_warning())
    }

    /// Returns `Ok` if there is no error-severity issue
    pub fn into_result(self) -> Result<Self, Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(self)
        }
    }

    pub(crate) fn into_compile_result<T>(self, value: T) -> CompileResult<T> {
        CompileResult {
            value: (!self.has_errors()).then_some(value),
            issues: self,
        }
    }

    /// Pretty-print all issues to a [`Write`][std::io::Write], without colors
    pub fn write(&self, mut w: impl std::io::Write) -> std::io::Result<()> {
        for issue in &self.issues {
            issue.report(&self.sources, Color::Never).write(&mut w)?
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a DiagnosticList {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}

/// Defaults to ANSI color codes if stderr is a terminal.
///
/// Use alternate formatting to never use colors: `format!("{diagnostics:#}")`
impl fmt::Debug for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Never
        } else {
            Color::StderrIsTerminal
        };
        for issue in &self.issues {
            issue.report(&self.sources, color).fmt(f)?
        }
        Ok(())
    }
}

impl fmt::Display for DiagnosticList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            issue.report(&self.sources, Color::Never).fmt(f)?
        }
        Ok(())
    }
}

/// A diagnostic report that can be printed to a CLI with pretty colors and labeled lines of
/// GraphQL source code.
pub struct CliReport {
    sources: SourceMap,
    colors: ColorGenerator,
    report: ariadne::ReportBuilder<'static, MappedSpan>,
}

/// Indicate when to use ANSI colors for printing.
#[derive(Debug, Clone, Copy)]
enum Color {
    /// Do not use colors.
    Never,
    /// Use colors if stderr is a terminal.
    StderrIsTerminal,
}

type MappedSpan = (FileId, Range<usize>);

/// Translate a byte-offset location into a char-offset location for use with ariadne.
fn map_span(sources: &SourceMap, location: NodeLocation) -> Option<MappedSpan> {
    let source = sources.get(&location.file_id)?;
    let mapped_source = source.mapped_source();
    let start = mapped_source.map_index(location.offset());
    let end = mapped_source.map_index(location.end_offset());
    Some((location.file_id, start..end))
}

/// Provide a [`std::io::Write`] API for a [`std::fmt::Formatter`].
struct WriteToFormatter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
}

impl io::Write for WriteToFormatter<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = std::str::from_utf8(buf).map_err(|_| io::ErrorKind::Other)?;
        self.f.write_str(s).map_err(|_| io::ErrorKind::Other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CliReport {
    fn builder(
        sources: SourceMap,
        kind: ReportKind<'static>,
        location: Option<NodeLocation>,
    ) -> Self {
        let (file_id, range) = location
            .and_then(|location| map_span(&sources, location))
            .unwrap_or((FileId::NONE, 0..0));
        Self {
            sources,
            colors: ColorGenerator::new(),
            report: ariadne::Report::build(kind, file_id, range.start),
        }
    }

    fn with_color(self, color: Color) -> Self {
        let enable_color = match color {
            Color::Never => false,
            // Rely on ariadne's `auto-color` feature, which uses `concolor` to enable colors
            // only if stderr is a terminal.
            Color::StderrIsTerminal => true,
        };
        let config = ariadne::Config::default().with_color(enable_color);
        Self {
            report: self.report.with_config(config),
            ..self
        }
    }

    /// Set the main message for the report.
    pub fn with_message(&mut self, message: impl ToString) {
        self.report.set_message(message);
    }

    /// Set the help message for the report, usually a suggestion on how to fix the error.
    pub fn with_help(&mut self, help: impl ToString) {
        self.report.set_help(help);
    }

    /// Add a label at a given location. If the location is `None`, the message is discarded.
    pub fn with_label_opt(&mut self, location: Option<NodeLocation>, message: impl ToString) {
        if let Some(mapped_span) = location.and_then(|location| map_span(&self.sources, location)) {
            self.report.add_label(
                ariadne::Label::new(mapped_span)
                    .with_message(message)
                    .with_color(self.colors.next()),
            );
        }
    }

    /// Write the report to a [`Write`].
    ///
    /// [`Write`]: std::io::Write
    pub fn write(self, w: impl std::io::Write) -> std::io::Result<()> {
        let report = self.report.finish();
        report.write(Cache(&self.sources), w)
    }

    /// Write the report to a [`fmt::Formatter`].
    pub fn fmt(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(WriteToFormatter { f }).map_err(|_| fmt::Error)
    }
}

struct Cache<'a>(&'a SourceMap);

impl ariadne::Cache<FileId> for Cache<'_> {
    type Storage = String;

    fn fetch(&mut self, file_id: &FileId) -> Result<&ariadne::Source, Box<dyn fmt::Debug + '_>> {
        struct NotFound(FileId);
        impl fmt::Debug for NotFound {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "source file not found: {:?}", self.0)
            }
        }
        if let Some(source_file) = self.0.get(file_id) {
            Ok(source_file.ariadne())
        } else if *file_id == FileId::NONE {
            static EMPTY: OnceLock<ariadne::Source> = OnceLock::new();
            Ok(EMPTY.get_or_init(|| ariadne::Source::from(String::new())))
        } else {
            Err(Box::new(NotFound(*file_id)))
        }
    }

    fn display<'a>(&self, file_id: &'a FileId) -> Option<Box<dyn fmt::Display + 'a>> {
        if *file_id != FileId::NONE {
            struct Path(Arc<SourceFile>);
            impl fmt::Display for Path {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.path().display().fmt(f)
                }
            }
            let source_file = self.0.get(file_id)?;
            Some(Box::new(Path(source_file.clone())))
        } else {
            struct NoSourceFile;
            impl fmt::Display for NoSourceFile {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("(no source file)")
                }
            }
            Some(Box::new(NoSourceFile))
        }
    }
}
