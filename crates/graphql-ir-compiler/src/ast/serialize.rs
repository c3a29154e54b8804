use super::*;
use std::fmt;

/// Writes GraphQL syntax with two-space indentation.
///
/// Only executable definitions, types and values are serialized:
/// this is what goes into the documents sent to servers at runtime.
pub(crate) struct State<'fmt, 'fmt2> {
    indent_level: usize,
    single_line: bool,
    output: &'fmt mut fmt::Formatter<'fmt2>,
}

macro_rules! display {
    ($state: expr, $e: expr) => {
        fmt::Display::fmt(&$e, $state.output)
    };
    ($state: expr, $($tt: tt)+) => {
        display!($state, format_args!($($tt)+))
    };
}

impl<'fmt, 'fmt2> State<'fmt, 'fmt2> {
    fn new(output: &'fmt mut fmt::Formatter<'fmt2>) -> Self {
        Self {
            indent_level: 0,
            single_line: false,
            output,
        }
    }

    fn write(&mut self, str: &str) -> fmt::Result {
        self.output.write_str(str)
    }

    fn indent_or_space(&mut self) -> fmt::Result {
        self.indent_level += 1;
        self.new_line_or_space()
    }

    fn dedent_or_space(&mut self) -> fmt::Result {
        self.indent_level -= 1; // checked underflow in debug mode
        self.new_line_or_space()
    }

    fn new_line_or_space(&mut self) -> fmt::Result {
        if self.single_line {
            return self.write(" ");
        }
        self.write("\n")?;
        for _ in 0..self.indent_level {
            self.write("  ")?;
        }
        Ok(())
    }

    fn on_single_line<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.single_line, true);
        let result = f(self);
        self.single_line = previous;
        result
    }
}

impl OperationDefinition {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        // Deconstruct to get a warning if we forget to serialize something
        let Self {
            operation_type,
            name,
            variables,
            directives,
            selection_set,
        } = self;
        state.write(operation_type.name())?;
        if let Some(name) = &name {
            state.write(" ")?;
            state.write(name)?;
        }
        if !variables.is_empty() {
            state.on_single_line(|state| {
                comma_separated(state, "(", ")", variables, |state, var| {
                    var.serialize_impl(state)
                })
            })?
        }
        directives.serialize_impl(state)?;
        state.write(" ")?;
        curly_brackets(state, selection_set)
    }
}

impl FragmentDefinition {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        let Self {
            name,
            type_condition,
            directives,
            selection_set,
        } = self;
        display!(state, "fragment {} on {}", name, type_condition)?;
        directives.serialize_impl(state)?;
        state.write(" ")?;
        curly_brackets(state, selection_set)
    }
}

impl VariableDefinition {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        let Self {
            name,
            ty,
            default_value,
            directives,
        } = self;
        display!(state, "${}: {}", name, ty)?;
        if let Some(value) = default_value {
            state.write(" = ")?;
            value.serialize_impl(state)?
        }
        directives.serialize_impl(state)
    }
}

impl DirectiveList {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        for dir in self {
            state.write(" ")?;
            dir.serialize_impl(state)?;
        }
        Ok(())
    }
}

impl Directive {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        state.write("@")?;
        state.write(&self.name)?;
        serialize_arguments(state, &self.arguments)
    }
}

impl Selection {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        match self {
            Selection::Field(x) => x.serialize_impl(state),
            Selection::FragmentSpread(x) => x.serialize_impl(state),
            Selection::InlineFragment(x) => x.serialize_impl(state),
        }
    }
}

impl Field {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        let Self {
            alias,
            name,
            arguments,
            directives,
            selection_set,
        } = self;
        if let Some(alias) = alias {
            state.write(alias)?;
            state.write(": ")?;
        }
        state.write(name)?;
        serialize_arguments(state, arguments)?;
        directives.serialize_impl(state)?;
        if !selection_set.is_empty() {
            state.write(" ")?;
            curly_brackets(state, selection_set)?
        }
        Ok(())
    }
}

impl FragmentSpread {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        state.write("...")?;
        state.write(&self.fragment_name)?;
        self.directives.serialize_impl(state)
    }
}

impl InlineFragment {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        let Self {
            type_condition,
            directives,
            selection_set,
        } = self;
        if let Some(type_name) = type_condition {
            state.write("... on ")?;
            state.write(type_name)?;
        } else {
            state.write("...")?;
        }
        directives.serialize_impl(state)?;
        state.write(" ")?;
        curly_brackets(state, selection_set)
    }
}

impl Value {
    fn serialize_impl(&self, state: &mut State) -> fmt::Result {
        match self {
            Value::Null => state.write("null"),
            Value::Boolean(true) => state.write("true"),
            Value::Boolean(false) => state.write("false"),
            Value::Enum(name) => state.write(name),
            Value::String(value) => serialize_string_value(state, value),
            Value::Variable(name) => display!(state, "${}", name),
            Value::Float(value) => display!(state, value),
            Value::Int(value) => display!(state, value),
            Value::List(value) => state.on_single_line(|state| {
                comma_separated(state, "[", "]", value, |state, value| {
                    value.serialize_impl(state)
                })
            }),
            Value::Object(value) => state.on_single_line(|state| {
                comma_separated(state, "{", "}", value, |state, (name, value)| {
                    state.write(name)?;
                    state.write(": ")?;
                    value.serialize_impl(state)
                })
            }),
        }
    }
}

fn serialize_arguments(state: &mut State, arguments: &[Node<Argument>]) -> fmt::Result {
    if !arguments.is_empty() {
        state.on_single_line(|state| {
            comma_separated(state, "(", ")", arguments, |state, argument| {
                state.write(&argument.name)?;
                state.write(": ")?;
                argument.value.serialize_impl(state)
            })
        })?
    }
    Ok(())
}

/// Example output: `(a: 1, b: 2)`
fn comma_separated<T>(
    state: &mut State,
    open: &str,
    close: &str,
    values: &[T],
    serialize_one: impl Fn(&mut State, &T) -> fmt::Result,
) -> fmt::Result {
    state.write(open)?;
    if let Some((first, rest)) = values.split_first() {
        serialize_one(state, first)?;
        for value in rest {
            state.write(", ")?;
            serialize_one(state, value)?;
        }
    }
    state.write(close)
}

/// Example output:
///
/// ```text
/// {
///   a
///   b
/// }
/// ```
fn curly_brackets(state: &mut State, selections: &[Selection]) -> fmt::Result {
    state.write("{")?;
    if let Some((first, rest)) = selections.split_first() {
        state.indent_or_space()?;
        first.serialize_impl(state)?;
        for selection in rest {
            state.new_line_or_space()?;
            selection.serialize_impl(state)?;
        }
        state.dedent_or_space()?;
    }
    state.write("}")
}

fn serialize_string_value(state: &mut State, mut str: &str) -> fmt::Result {
    state.write("\"")?;
    loop {
        if let Some(i) = str.find(|c| (c < ' ' && c != '\t') || c == '"' || c == '\\') {
            let (without_escaping, rest) = str.split_at(i);
            state.write(without_escaping)?;
            // All characters that need escaping are in the ASCII range,
            // and so take a single byte in UTF-8.
            match rest.as_bytes()[0] {
                b'\x08' => state.write("\\b")?,
                b'\n' => state.write("\\n")?,
                b'\x0C' => state.write("\\f")?,
                b'\r' => state.write("\\r")?,
                b'"' => state.write("\\\"")?,
                b'\\' => state.write("\\\\")?,
                byte => display!(state, "\\u{:04X}", byte)?,
            }
            str = &rest[1..]
        } else {
            state.write(str)?;
            break;
        }
    }
    state.write("\"")
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => write!(f, "{name}"),
            Type::NonNullNamed(name) => write!(f, "{name}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

macro_rules! impl_display {
    ($($ty: ty)+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.serialize_impl(&mut State::new(f))
                }
            }
        )+
    };
}

impl_display! {
    OperationDefinition
    FragmentDefinition
    Selection
    Field
    Directive
    Value
}

/// Returns a copy of `selections` with every directive named in `names` removed, recursively.
///
/// Used to remove client-only directives before a document is sent to a server.
pub fn strip_directives(selections: &[Selection], names: &[String]) -> Vec<Selection> {
    selections
        .iter()
        .map(|selection| match selection {
            Selection::Field(field) => {
                let mut new = field.clone();
                let inner = new.make_mut();
                inner.directives = strip_list(&field.directives, names);
                inner.selection_set = strip_directives(&field.selection_set, names);
                Selection::Field(new)
            }
            Selection::FragmentSpread(spread) => {
                let mut new = spread.clone();
                new.make_mut().directives = strip_list(&spread.directives, names);
                Selection::FragmentSpread(new)
            }
            Selection::InlineFragment(inline) => {
                let mut new = inline.clone();
                let inner = new.make_mut();
                inner.directives = strip_list(&inline.directives, names);
                inner.selection_set = strip_directives(&inline.selection_set, names);
                Selection::InlineFragment(new)
            }
        })
        .collect()
}

pub(crate) fn strip_list(directives: &DirectiveList, names: &[String]) -> DirectiveList {
    directives
        .iter()
        .filter(|dir| !names.iter().any(|name| dir.name == name.as_str()))
        .cloned()
        .collect()
}
