use log::debug;

use super::comments::strip_comments;
use super::loops::preinitialize_loop_variables;
use super::orphans::remove_orphaned_assignments;
use super::output_decl::fix_output_redeclaration;
use super::types::{RepairOptions, RepairOutput, RepairReport, RepairState};
use super::uninit::{initialize_declarations, resolve_undeclared_assignments, sweep_standalone};

/// Repair a shader body with the default options and return only the repaired text.
pub fn repair_shader_code(code: &str) -> String {
    repair_shader_code_with(code, &RepairOptions::default()).code
}

/// Run every repair pass in order:
/// 1. Strip comments
/// 2. Initialize uninitialized declarations
/// 3. Declare or drop assignments to undeclared names
/// 4. Sweep remaining bare declarations
/// 5. Remove orphaned assignments
/// 6. Fix a redeclared entry output
/// 7. Pre-initialize loop variables
pub fn repair_shader_code_with(code: &str, options: &RepairOptions) -> RepairOutput {
    let mut state = RepairState::default();
    let mut report = RepairReport::default();

    let stripped = strip_comments(code);
    let lines: Vec<String> = stripped.lines().map(str::to_string).collect();

    let lines = initialize_declarations(&lines, options, &mut state, &mut report);
    let lines = resolve_undeclared_assignments(&lines, options, &mut report);
    let lines = sweep_standalone(&lines, options, &mut state, &mut report);
    let lines = remove_orphaned_assignments(&lines, options, &mut report);
    let lines = fix_output_redeclaration(&lines, options, &mut report);
    let code = preinitialize_loop_variables(&lines.join("\n"), options, &state, &mut report);

    debug!(
        "shader repair: {} rewrites ({} declarations initialized, {} orphans removed, {} loop inits)",
        report.total(),
        report.chain_initialized
            + report.standalone_initialized
            + report.declarations_initialized
            + report.sweep_initialized,
        report.orphans_removed,
        report.loop_inits_inserted,
    );
    debug!("repaired shader body:\n{code}");

    RepairOutput {
        code,
        state,
        report,
    }
}
