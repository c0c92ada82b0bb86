use crate::parser::{Expr, LiteralValue};

/// Renders an expression back to source-shaped text.
///
/// Operators print infix with single spaces, calls and property
/// accesses print as written, and `Grouping` is the only form that
/// emits parentheses. For canonically spaced single-line sources the
/// output is byte-identical to the input.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr<'_>) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => format!("\"{}\"", s),

                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        // 3.0 → 3
                        format!("{:.0}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            // ── grouping ────────────────────────────────────────────────
            Expr::Grouping(inner) => format!("({})", Self::print(inner)),

            // ── unary operator ──────────────────────────────────────────
            Expr::Unary { operator, right } => {
                format!("{}{}", operator.lexeme, Self::print(right))
            }

            // ── binary / logical operators ──────────────────────────────
            Expr::Binary {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::print(left),
                operator.lexeme,
                Self::print(right)
            ),

            Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "{} {} {}",
                Self::print(left),
                operator.lexeme,
                Self::print(right)
            ),

            // ── comma and ternary ───────────────────────────────────────
            Expr::Comma { left, right } => {
                format!("{}, {}", Self::print(left), Self::print(right))
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => format!(
                "{} ? {} : {}",
                Self::print(condition),
                Self::print(then_branch),
                Self::print(else_branch)
            ),

            // ── variables and assignment ────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.into(),

            Expr::Assign { name, value, .. } => {
                format!("{} = {}", name.lexeme, Self::print(value))
            }

            // ── calls ───────────────────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let rendered: Vec<String> = arguments.iter().map(Self::print).collect();
                format!("{}({})", Self::print(callee), rendered.join(", "))
            }

            // ── property access ─────────────────────────────────────────
            Expr::Get { object, name } => {
                format!("{}.{}", Self::print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "{}.{} = {}",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            // ── class keywords ──────────────────────────────────────────
            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("super.{}", method.lexeme),
        }
    }
}
