mod common;

use common::{
    ResourceFactory, ResourceInterpreter, TestOp, TestProgram, invoke, method,
};

use argus_analysis::{
    AnalysisContext, AnalysisError, AnalysisPolicy, InterproceduralAnalyzer, MethodFilter,
    MethodId, MethodPhase,
};
use argus_domain::SetDomain;

type Context = AnalysisContext<TestOp, SetDomain, ResourceFactory>;

fn analyzer<'a>(
    context: &'a Context,
    program: &'a TestProgram,
    interp: &'a ResourceInterpreter,
) -> InterproceduralAnalyzer<'a, SetDomain, TestProgram, TestProgram, ResourceInterpreter, ResourceFactory>
{
    InterproceduralAnalyzer::new(context, program, program, interp)
}

/// `open()` produces one callee-local resource; `use_twice()` calls it at
/// two sites. Renaming must yield two distinct caller-side resources, not
/// one resource double-counted.
#[test]
fn summary_renaming_keeps_call_sites_distinct() {
    let open = method(0);
    let use_twice = method(1);
    let (site_a, site_b) = (invoke(1), invoke(2));

    let mut program = TestProgram::new();
    program.add_linear_method(open, &[TestOp::Gen("local:handle")]);
    program.add_linear_method(
        use_twice,
        &[TestOp::Nop, TestOp::Call(site_a), TestOp::Call(site_b)],
    );
    program.add_call(site_a, &[open]);
    program.add_call(site_b, &[open]);

    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: true },
    );
    let interp = ResourceInterpreter;
    let report = analyzer(&context, &program, &interp)
        .analyze(use_twice)
        .unwrap();

    assert_eq!(report.post(), &SetDomain::from_facts(["r1", "r2"]));

    use argus_analysis::CallGraph;
    assert_eq!(program.invoke_sites(use_twice), vec![site_a, site_b]);
    assert!(program.is_implementation_invoked(open));
    assert!(!program.is_implementation_invoked(use_twice));
}

/// Two call sites with equal argument abstractions reuse one cached
/// summary; the callee body is analyzed exactly once.
#[test]
fn second_call_site_reuses_the_summary() {
    let open = method(0);
    let use_twice = method(1);
    let (site_a, site_b) = (invoke(1), invoke(2));

    let mut program = TestProgram::new();
    program.add_linear_method(open, &[TestOp::Gen("file")]);
    program.add_linear_method(
        use_twice,
        &[TestOp::Nop, TestOp::Call(site_a), TestOp::Call(site_b)],
    );
    program.add_call(site_a, &[open]);
    program.add_call(site_b, &[open]);

    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;
    let report = analyzer(&context, &program, &interp)
        .analyze(use_twice)
        .unwrap();

    assert_eq!(report.post(), &SetDomain::from_facts(["file"]));
    // use_twice + open, analyzed once each.
    assert_eq!(context.stats().methods_analyzed(), 2);
    assert_eq!(context.stats().summary_misses(), 1);
    assert_eq!(context.stats().summary_hits(), 1);
}

/// A call chain deeper than the stack bound converges to the conservative
/// value instead of recursing past the bound.
#[test]
fn depth_bound_yields_the_conservative_value() {
    let mut program = TestProgram::new();
    let methods: Vec<MethodId> = (0..6).map(method).collect();
    for (index, &m) in methods.iter().enumerate() {
        if index + 1 < methods.len() {
            let site = invoke(index as u32);
            program.add_linear_method(m, &[TestOp::Gen("step"), TestOp::Call(site)]);
            program.add_call(site, &[methods[index + 1]]);
        } else {
            program.add_linear_method(m, &[TestOp::Nop]);
        }
    }

    let context = Context::new(
        AnalysisPolicy::default().with_max_stack_depth(3),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;
    let report = analyzer(&context, &program, &interp)
        .analyze(methods[0])
        .unwrap();

    assert_eq!(report.post(), &SetDomain::Top);
    // Only the three methods within the bound ran a fixpoint.
    assert_eq!(context.stats().methods_analyzed(), 3);
    assert!(context.stats().conservative_cutoffs() >= 1);
}

/// Mutual recursion is cut off by the compacted-stack cycle test and the
/// analysis still terminates with a sound (conservative) result.
#[test]
fn mutual_recursion_terminates_via_cycle_cutoff() {
    let (a, b) = (method(0), method(1));
    let (site_ab, site_ba) = (invoke(0), invoke(1));

    let mut program = TestProgram::new();
    program.add_linear_method(a, &[TestOp::Gen("a"), TestOp::Call(site_ab)]);
    program.add_linear_method(b, &[TestOp::Gen("b"), TestOp::Call(site_ba)]);
    program.add_call(site_ab, &[b]);
    program.add_call(site_ba, &[a]);

    let context = Context::new(
        AnalysisPolicy::default().with_max_consecutive_calls(3),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;
    let report = analyzer(&context, &program, &interp).analyze(a).unwrap();

    assert_eq!(report.post(), &SetDomain::Top);
    assert!(context.stats().conservative_cutoffs() >= 1);
}

/// An unresolvable callee degrades to the unknown effect; an unresolvable
/// root is an error.
#[test]
fn unresolvable_methods_are_recoverable_per_call() {
    let caller = method(0);
    let missing = method(7);
    let site = invoke(0);
    let dangling = invoke(9);

    let mut program = TestProgram::new();
    program.add_linear_method(
        caller,
        &[TestOp::Gen("before"), TestOp::Call(site), TestOp::Call(dangling)],
    );
    program.add_call(site, &[missing]);
    // `dangling` has no statically known callees at all.

    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;
    let analyzer = analyzer(&context, &program, &interp);

    let report = analyzer.analyze(caller).unwrap();
    assert_eq!(report.post(), &SetDomain::Top);

    let err = analyzer.analyze(missing).unwrap_err();
    assert!(matches!(err, AnalysisError::Unresolvable(m) if m == missing));
}

struct DenyList(Vec<MethodId>);

impl MethodFilter for DenyList {
    fn should_analyze(&self, method: MethodId) -> bool {
        !self.0.contains(&method)
    }
}

#[test]
fn filtered_callees_get_the_unknown_effect() {
    let caller = method(0);
    let library = method(1);
    let site = invoke(0);

    let mut program = TestProgram::new();
    program.add_linear_method(caller, &[TestOp::Gen("app"), TestOp::Call(site)]);
    program.add_linear_method(library, &[TestOp::Gen("lib")]);
    program.add_call(site, &[library]);

    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    )
    .with_filter(DenyList(vec![library]));
    let interp = ResourceInterpreter;
    let analyzer = analyzer(&context, &program, &interp);

    let report = analyzer.analyze(caller).unwrap();
    assert_eq!(report.post(), &SetDomain::Top);

    let err = analyzer.analyze(library).unwrap_err();
    assert!(matches!(err, AnalysisError::Filtered(m) if m == library));
}

fn shared_helper_program() -> (TestProgram, MethodId, [MethodId; 2]) {
    // root -> d -> c, root -> e -> c
    let (root, d, e, c) = (method(0), method(1), method(2), method(3));
    let (site_rd, site_re, site_dc, site_ec) = (invoke(0), invoke(1), invoke(2), invoke(3));

    let mut program = TestProgram::new();
    program.add_linear_method(root, &[TestOp::Call(site_rd), TestOp::Call(site_re)]);
    program.add_linear_method(d, &[TestOp::Call(site_dc)]);
    program.add_linear_method(e, &[TestOp::Call(site_ec)]);
    program.add_linear_method(c, &[TestOp::Gen("c")]);
    program.add_call(site_rd, &[d]);
    program.add_call(site_re, &[e]);
    program.add_call(site_dc, &[c]);
    program.add_call(site_ec, &[c]);
    (program, root, [d, e])
}

/// `k = 0` shares one summary for the helper across both callers;
/// `k = 1` distinguishes the two call histories and analyzes it twice.
#[test]
fn context_depth_controls_summary_sharing() {
    let (program, root, _) = shared_helper_program();
    let interp = ResourceInterpreter;

    let insensitive = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    );
    analyzer(&insensitive, &program, &interp).analyze(root).unwrap();
    // root, d, e, and c once.
    assert_eq!(insensitive.stats().methods_analyzed(), 4);
    assert_eq!(insensitive.stats().summary_hits(), 1);

    let sensitive = Context::new(
        AnalysisPolicy::default().with_context_depth(1),
        ResourceFactory { site_scoped: false },
    );
    analyzer(&sensitive, &program, &interp).analyze(root).unwrap();
    // c re-analyzed under the second call history.
    assert_eq!(sensitive.stats().methods_analyzed(), 5);
    assert_eq!(sensitive.stats().summary_hits(), 0);
}

#[test]
fn converged_methods_are_tracked() {
    let (program, root, _) = shared_helper_program();
    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;

    let report = analyzer(&context, &program, &interp).analyze(root).unwrap();
    assert_eq!(report.method(), root);
    assert_eq!(
        context.phase(root, report.context()),
        MethodPhase::Converged
    );
}

/// Independent entry points analyzed in parallel share the summary store
/// and caches; every worker owns its call stack.
#[test]
fn parallel_roots_share_the_caches() {
    let helper = method(100);
    let helper_site = |caller: u32| invoke(1000 + caller);

    let mut program = TestProgram::new();
    program.add_linear_method(helper, &[TestOp::Gen("shared")]);
    let roots: Vec<MethodId> = (0..8)
        .map(|index| {
            let root = method(index);
            let site = helper_site(index);
            program.add_linear_method(root, &[TestOp::Gen("own"), TestOp::Call(site)]);
            program.add_call(site, &[helper]);
            root
        })
        .collect();

    let context = Context::new(
        AnalysisPolicy::default(),
        ResourceFactory { site_scoped: false },
    );
    let interp = ResourceInterpreter;
    let results = analyzer(&context, &program, &interp).analyze_roots(&roots);

    assert_eq!(results.len(), roots.len());
    for (_, result) in results {
        let report = result.unwrap();
        assert_eq!(report.post(), &SetDomain::from_facts(["own", "shared"]));
    }
    assert!(context.graph_cache().graph_count() >= roots.len());
    assert!(!context.summaries().is_empty());
}
