//! Folding walkthrough
//!
//! Folds an indented block, edits through the projection and undoes the edit.

use foldline_core::{Command, CommandExecutor, EditCommand, EditorConfig, FoldCommand};

fn print_view(executor: &CommandExecutor) {
    let core = executor.core();
    for (line, text) in core.projection().lines().enumerate() {
        let logical = core.projection().logical_line(line + 1).unwrap_or(0);
        let marker = match core.folding().region_at(logical) {
            Some(_) if core.folding().is_folded(logical) => "▸",
            Some(_) => "▾",
            None => " ",
        };
        println!("  {logical:>3} {marker} {text}");
    }
    println!("  selection: {:?}\n", core.selection());
}

fn main() {
    let source = "def area(shape):
    if shape.kind == 'circle':
        return 3.14 * shape.r ** 2
    return shape.w * shape.h

print(area(s))";
    let mut executor = CommandExecutor::new(source, EditorConfig::default());

    println!("1. Regions detected from indentation:");
    for region in executor.core().folding().regions() {
        println!("  lines {}..={}", region.start_line, region.end_line);
    }
    println!();

    println!("2. Fold the function body:");
    executor.execute(Command::Fold(FoldCommand::Toggle { line: 1 }));
    print_view(&executor);

    println!("3. Insert a blank line above the fold (the fold moves down):");
    executor.execute(Command::Edit(EditCommand::InsertNewline));
    print_view(&executor);

    println!("4. Undo restores the text and recomputes the folds:");
    executor.execute(Command::Edit(EditCommand::Undo));
    print_view(&executor);

    println!("5. Fold everything, then unfold:");
    executor.execute(Command::Fold(FoldCommand::FoldAll));
    print_view(&executor);
    executor.execute(Command::Fold(FoldCommand::UnfoldAll));
    print_view(&executor);
}
