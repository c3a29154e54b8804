use crate::ast;
use crate::ast::Document;
use crate::diagnostic::CompileResult;
use crate::diagnostic::DiagnosticList;
use crate::validation::DiagnosticData;
use crate::FileId;
use crate::NodeLocation;
use indexmap::IndexMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

/// Configuration for parsing an input string as GraphQL syntax
#[derive(Default, Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Parser {
    recursion_limit: Option<usize>,
    token_limit: Option<usize>,
    #[serde(skip)]
    recursion_reached: usize,
    #[serde(skip)]
    tokens_reached: usize,
}

/// Records for validation information about a file that was parsed
#[derive(Clone)]
pub struct SourceFile {
    pub(crate) path: PathBuf,
    pub(crate) source_text: String,
    pub(crate) source: OnceLock<MappedSource>,
}

pub type SourceMap = Arc<IndexMap<FileId, Arc<SourceFile>>>;

/// A 1-based line and column position within a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// Translate byte offsets to ariadne's char offsets.
#[derive(Debug, Clone)]
pub(crate) struct MappedSource {
    ariadne: ariadne::Source,
    map: Vec<u32>,
}

/// Parse the given source text into an AST document with the default configuration.
///
/// `path` is the filesystem path (or arbitrary string) used in diagnostics
/// to identify this source file to users.
pub fn parse_ast(
    source_text: impl Into<String>,
    path: impl AsRef<Path>,
) -> CompileResult<Document> {
    Parser::new().parse_ast(source_text, path)
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the recursion to use while parsing.
    pub fn recursion_limit(mut self, value: usize) -> Self {
        self.recursion_limit = Some(value);
        self
    }

    /// Configure the limit on the number of tokens to parse.
    /// If an input document is too big, parsing will be aborted.
    /// By default, there is no limit.
    pub fn token_limit(mut self, value: usize) -> Self {
        self.token_limit = Some(value);
        self
    }

    /// Parse the given source text into an AST document.
    ///
    /// The document is returned only if there was no syntax error.
    pub fn parse_ast(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> CompileResult<Document> {
        let mut errors = DiagnosticList::new(Default::default());
        let ast = self.parse_ast_inner(source_text, path, FileId::new(), &mut errors);
        errors.into_compile_result(ast)
    }

    pub(crate) fn parse_ast_inner(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
        file_id: FileId,
        errors: &mut DiagnosticList,
    ) -> Document {
        let tree = self.parse_common(
            source_text.into(),
            path.as_ref().to_owned(),
            file_id,
            errors,
            |parser| parser.parse(),
        );
        let sources = errors.sources.clone();
        Document::from_cst(tree.document(), file_id, sources)
    }

    fn parse_common<T: apollo_parser::cst::CstNode>(
        &mut self,
        source_text: String,
        path: PathBuf,
        file_id: FileId,
        errors: &mut DiagnosticList,
        parse: impl FnOnce(apollo_parser::Parser) -> apollo_parser::SyntaxTree<T>,
    ) -> apollo_parser::SyntaxTree<T> {
        let mut parser = apollo_parser::Parser::new(&source_text);
        if let Some(value) = self.recursion_limit {
            parser = parser.recursion_limit(value)
        }
        if let Some(value) = self.token_limit {
            parser = parser.token_limit(value)
        }
        let tree = parse(parser);
        self.recursion_reached = tree.recursion_limit().high;
        self.tokens_reached = tree.token_limit().high;
        let source_file = Arc::new(SourceFile {
            path,
            source_text,
            source: OnceLock::new(),
        });
        Arc::make_mut(&mut errors.sources).insert(file_id, source_file);
        for parser_error in tree.errors() {
            // Silently skip parse errors at index beyond 4 GiB.
            let Ok(index) = parser_error.index().try_into() else {
                continue;
            };
            let Ok(len) = parser_error.data().len().try_into() else {
                continue;
            };
            let location = Some(NodeLocation {
                file_id,
                text_range: rowan::TextRange::at(index, len),
            });
            let data = if parser_error.is_limit() {
                DiagnosticData::ParserLimit {
                    message: parser_error.message().to_owned(),
                }
            } else {
                DiagnosticData::SyntaxError {
                    message: parser_error.message().to_owned(),
                }
            };
            errors.push(location, data)
        }
        log::trace!(
            "parsed {} ({} tokens, recursion {})",
            errors.sources[&file_id].path.display(),
            self.tokens_reached,
            self.recursion_reached
        );
        tree
    }

    /// Parse a selection set stored in a string, with optional outer brackets.
    ///
    /// This is the re-entry point for directives that hold field selections as string
    /// arguments, such as `@typePolicy(keyFields: "id")` or `@nonnull(fields: "a b")`.
    pub fn parse_field_set(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> CompileResult<Vec<ast::Selection>> {
        let mut errors = DiagnosticList::new(Default::default());
        let selections =
            self.parse_field_set_inner(source_text, path, FileId::new(), &mut errors);
        errors.into_compile_result(selections)
    }

    pub(crate) fn parse_field_set_inner(
        &mut self,
        source_text: impl Into<String>,
        path: impl AsRef<Path>,
        file_id: FileId,
        errors: &mut DiagnosticList,
    ) -> Vec<ast::Selection> {
        let tree = self.parse_common(
            source_text.into(),
            path.as_ref().to_owned(),
            file_id,
            errors,
            |parser| parser.parse_selection_set(),
        );
        ast::from_cst::convert_selection_set(&tree.field_set(), file_id)
    }

    /// What level of recursion was reached during the last call to a `parse_*` method.
    pub fn recursion_reached(&self) -> usize {
        self.recursion_reached
    }

    /// How many tokens were created during the last call to a `parse_*` method.
    pub fn tokens_reached(&self) -> usize {
        self.tokens_reached
    }
}

impl MappedSource {
    fn new(input: &str) -> Self {
        let ariadne = ariadne::Source::from(input.to_owned());

        let mut map = vec![0; input.len() + 1];
        let mut char_index = 0;
        for (byte_index, _) in input.char_indices() {
            map[byte_index] = char_index;
            char_index += 1;
        }

        // Support 1 past the end of the string, for use in exclusive ranges.
        map[input.len()] = char_index;

        Self { ariadne, map }
    }

    pub(crate) fn map_index(&self, byte_index: usize) -> usize {
        self.map[byte_index] as usize
    }
}

impl SourceFile {
    /// The filesystem path (or arbitrary string) used in diagnostics
    /// to identify this source file to users.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub(crate) fn ariadne(&self) -> &ariadne::Source {
        &self.mapped_source().ariadne
    }

    pub(crate) fn mapped_source(&self) -> &MappedSource {
        self.source
            .get_or_init(|| MappedSource::new(&self.source_text))
    }

    /// Convert a byte offset into a 1-based line and column
    pub fn get_line_column(&self, index: usize) -> Option<LineColumn> {
        if index > self.source_text.len() {
            return None;
        }
        let char_index = self.mapped_source().map_index(index);
        let (_, line, column) = self.ariadne().get_offset_line(char_index)?;
        Some(LineColumn {
            line: line + 1,
            column: column + 1,
        })
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            path,
            source_text,
            source: _, // Skipped: it’s a cache and would make debugging other things noisy
        } = self;
        let mut debug_struct = f.debug_struct("SourceFile");
        debug_struct.field("path", path);
        if path != Path::new(crate::schema::BUILT_IN_PATH) {
            debug_struct.field("source_text", source_text);
        } else {
            debug_struct.field(
                "source_text",
                &format_args!("include_str!(\"built_in.graphql\")"),
            );
        }
        debug_struct.finish()
    }
}
