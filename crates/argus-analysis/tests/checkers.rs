mod common;

use common::{ResourceFactory, ResourceInterpreter, TestOp, TestProgram, invoke, method};

use argus_analysis::{
    AnalysisContext, AnalysisPolicy, Checker, CheckerError, Diagnostic, InterproceduralAnalyzer,
    MethodReport,
};
use argus_domain::SetDomain;

type Context = AnalysisContext<TestOp, SetDomain, ResourceFactory>;

/// Flags methods whose converged postcondition still holds an open
/// resource.
struct OpenResourceChecker;

impl Checker<SetDomain> for OpenResourceChecker {
    fn name(&self) -> &str {
        "open-resource"
    }

    fn check(
        &self,
        report: &MethodReport<SetDomain>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), CheckerError> {
        if report.post().contains("file") {
            diagnostics.push(Diagnostic {
                method: report.method(),
                node: None,
                message: "resource possibly never closed".to_owned(),
            });
        }
        Ok(())
    }
}

struct FailingChecker;

impl Checker<SetDomain> for FailingChecker {
    fn name(&self) -> &str {
        "failing"
    }

    fn check(
        &self,
        _report: &MethodReport<SetDomain>,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), CheckerError> {
        Err(CheckerError("deliberate failure".to_owned()))
    }
}

struct PanickingChecker;

impl Checker<SetDomain> for PanickingChecker {
    fn name(&self) -> &str {
        "panicking"
    }

    fn check(
        &self,
        _report: &MethodReport<SetDomain>,
        _diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), CheckerError> {
        panic!("checker bug");
    }
}

fn leaky_program() -> (TestProgram, argus_analysis::MethodId) {
    let open = method(0);
    let main = method(1);
    let site = invoke(0);

    let mut program = TestProgram::new();
    program.add_linear_method(open, &[TestOp::Gen("file")]);
    program.add_linear_method(main, &[TestOp::Nop, TestOp::Call(site)]);
    program.add_call(site, &[open]);
    (program, main)
}

#[test]
fn checkers_observe_converged_states() {
    let (program, main) = leaky_program();
    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    )
    .with_checker(OpenResourceChecker);
    let interp = ResourceInterpreter;

    InterproceduralAnalyzer::new(&context, &program, &program, &interp)
        .analyze(main)
        .unwrap();

    let diagnostics = context.take_diagnostics();
    // Both `open` and `main` converge with the open resource.
    assert_eq!(diagnostics.len(), 2);
    assert!(
        diagnostics
            .iter()
            .all(|d| d.message.contains("never closed"))
    );
    // The sink drains.
    assert!(context.take_diagnostics().is_empty());
}

/// One checker's error or panic must not disturb the other checkers or
/// the analysis itself.
#[test]
fn checker_failures_are_isolated() {
    let (program, main) = leaky_program();
    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    )
    .with_checker(FailingChecker)
    .with_checker(PanickingChecker)
    .with_checker(OpenResourceChecker);
    let interp = ResourceInterpreter;

    let report = InterproceduralAnalyzer::new(&context, &program, &program, &interp)
        .analyze(main)
        .unwrap();
    assert_eq!(report.post(), &SetDomain::from_facts(["file"]));

    let diagnostics = context.take_diagnostics();
    assert_eq!(diagnostics.len(), 2);
}
