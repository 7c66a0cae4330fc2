use std::fs::File;
use std::io::{BufWriter, Write};

use crate::ast_def::{Ast, NodeId};
use crate::visitor::AstVisitor;

type IOResult = std::io::Result<()>;

pub fn debug_ast(ast: &Ast, file_name: String) -> IOResult {
    let output = File::create(file_name)?;
    let mut writer = BufWriter::new(output);

    print_ast(&mut writer, ast)?;

    writer.flush()?;

    Ok(())
}

/// Writes one line per node, indented by depth. Shared declaration leaves are
/// printed at every occurrence, so identical labels mark aliased identifiers.
pub fn print_ast<W: Write>(writer: &mut W, ast: &Ast) -> IOResult {
    let Some(root) = ast.root() else {
        return Ok(());
    };

    let mut printer = AstPrinter { lines: vec![] };
    printer.visit(ast, root, &0);

    for line in printer.lines {
        writeln!(writer, "{}", line)?;
    }

    Ok(())
}

struct AstPrinter {
    lines: Vec<String>,
}

impl AstVisitor for AstPrinter {
    type Output = ();
    type Params = usize;

    fn visit(&mut self, ast: &Ast, node: NodeId, depth: &usize) {
        self.lines
            .push(format!("{}{}", "  ".repeat(*depth), ast.label(node)));
        self.visit_children(ast, node, &(depth + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NodeKind, Slot};

    #[test]
    fn indents_by_depth() {
        let mut ast = Ast::new();
        let unit = ast.add_composite(NodeKind::CompileUnit, None);
        let assign = ast.add_composite(NodeKind::Assignment, Some(unit));
        let x = ast.add_identifier("x", Some(assign));
        let one = ast.add_number("1", Some(assign)).unwrap();
        ast.add_child(assign, Slot::Identifier, x);
        ast.add_child(assign, Slot::Expression, one);
        ast.add_child(unit, Slot::Statements, assign);

        let mut out = Vec::new();
        print_ast(&mut out, &ast).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("COMPILE_UNIT(0)-S"));
        assert!(lines[1].starts_with("  EXPRESSION_ASSIGNMENT(21)-S"));
        assert!(lines[2].starts_with("    x-IDENTIFIER(27)-S"));
        assert!(lines[3].starts_with("    1-NUMBER(28)-S"));
    }
}
