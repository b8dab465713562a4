//! Handles all user-facing output for the CLI.
//!
//! Bindings are rendered in the requested format; status lines and diffs are
//! colorized when stdout is a terminal.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::BindingFormat;
use crate::engine::PipelineError;
use crate::extract::Binding;

/// Renders bindings as JSON or YAML.
pub fn format_bindings(bindings: &[Binding], format: BindingFormat) -> Result<String, PipelineError> {
    Ok(match format {
        BindingFormat::Json => serde_json::to_string_pretty(bindings)?,
        BindingFormat::Yaml => serde_yaml::to_string(bindings)?,
    })
}

/// Prints a green status line.
pub fn print_success(message: &str) {
    print_colored(StandardStream::stdout(ColorChoice::Auto), Color::Green, message);
}

/// Prints a yellow status line to stderr, keeping stdout for command output.
pub fn print_notice(message: &str) {
    print_colored(StandardStream::stderr(ColorChoice::Auto), Color::Yellow, message);
}

/// Prints a line diff of `before` against `after`.
pub fn print_schema_diff(before: &str, after: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let changeset = Changeset::new(before, after, "\n");
    if changeset.distance == 0 {
        let _ = stdout.reset();
        println!("{}", after.trim_end());
        return;
    }
    print_diff(&mut stdout, &changeset.diffs);
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_colored(mut stream: StandardStream, color: Color, message: &str) {
    let _ = stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(stream, "{}", message);
    let _ = stream.reset();
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        let (marker, color, text) = match diff {
            Difference::Same(ref x) => (' ', None, x),
            Difference::Add(ref x) => ('+', Some(Color::Green), x),
            Difference::Rem(ref x) => ('-', Some(Color::Red), x),
        };
        let _ = match color {
            Some(color) => stdout.set_color(ColorSpec::new().set_fg(Some(color))),
            None => stdout.reset(),
        };
        for line in text.lines() {
            let _ = writeln!(stdout, "{}{}", marker, line);
        }
    }
    let _ = stdout.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_bindings_use_camel_case_keys() {
        let bindings = [Binding::new("Query", "GetTodo", "todo.get")];
        let yaml = format_bindings(&bindings, BindingFormat::Yaml).unwrap();
        assert!(yaml.contains("qualifiedName: Query_GetTodo"));
        assert!(yaml.contains("handler: todo.get"));
    }

    #[test]
    fn test_empty_bindings_render_as_empty_list() {
        assert_eq!(format_bindings(&[], BindingFormat::Json).unwrap(), "[]");
    }
}
