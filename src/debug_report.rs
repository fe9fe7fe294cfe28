use bandpath::lang::{ParseTree, Token};
use bandpath::observatory::ResolvedPath;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_expression(
    input: &str,
    tokens: &[Token],
    tree: &ParseTree,
    calls: &[String],
    plan: &str,
    color: bool,
) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Interpreting: \"{input}\""), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Tokens ━━━", ansi::GRAY));
    for tok in tokens {
        println!(
            "  {} {}",
            palette.paint(format!("{:>4}", tok.pos), ansi::GRAY),
            palette.paint(format!("{:?} {:?}", tok.kind, tok.text), ansi::BLUE),
        );
    }

    println!("\n{}", palette.paint("━━━ Parse tree ━━━", ansi::GRAY));
    print_tree(tree, 1, &palette);

    println!("\n{}", palette.paint("━━━ Factory calls ━━━", ansi::GRAY));
    for (idx, call) in calls.iter().enumerate() {
        println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), palette.paint(call, ansi::YELLOW));
    }

    println!("\n{}", palette.paint("━━━ Plan ━━━", ansi::GRAY));
    println!("  {}", palette.bold(palette.paint(plan, ansi::GREEN)));
    println!();
}

fn print_tree(tree: &ParseTree, depth: usize, palette: &ansi::Palette) {
    let indent = "  ".repeat(depth);
    match tree {
        ParseTree::Leaf(tok) => {
            println!("{indent}{}", palette.paint(format!("{:?} {:?}", tok.kind, tok.text), ansi::BLUE));
        }
        ParseTree::Node { tag, children } => {
            println!("{indent}{}", palette.paint(format!("{tag:?}"), ansi::CYAN));
            for child in children {
                print_tree(child, depth + 1, palette);
            }
        }
    }
}

pub fn print_path(path: &ResolvedPath, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Obsmode: \"{}\"", path.obsmode), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Optical components ━━━", ansi::GRAY));
    if path.optical.is_empty() {
        println!("{}", palette.dim("  Clear path, no components"));
    }
    for (idx, comp) in path.optical.iter().enumerate() {
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{idx}]"), ansi::GRAY),
            palette.bold(palette.paint(&comp.name, ansi::GREEN)),
            palette.dim("│"),
            palette.paint(&comp.throughput_file, ansi::YELLOW),
        );
        if let Some(param) = &comp.param {
            println!("      {} {}", palette.dim("param:"), palette.paint(format!("{param:?}"), ansi::BLUE));
        }
    }

    if !path.thermal.is_empty() {
        println!("\n{}", palette.paint("━━━ Thermal components ━━━", ansi::GRAY));
        for comp in &path.thermal {
            println!("  {} {} {}", palette.paint(&comp.name, ansi::GREEN), palette.dim("│"), palette.paint(&comp.throughput_file, ansi::YELLOW));
        }
    }

    if !path.modifiers.is_empty() {
        println!("\n{}", palette.paint("━━━ Modifiers ━━━", ansi::GRAY));
        println!("  {}", palette.paint(path.modifiers.join(", "), ansi::BLUE));
    }
    println!();
}
