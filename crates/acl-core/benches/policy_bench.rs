use acl_core::{
    evaluate, from_interchange, to_interchange, CombiningAlgorithm, Dialect, Policy, Request,
    Rule,
};
use acl_core::{AttributeCategory, Effect};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn create_test_policy(num_rules: usize, algorithm: CombiningAlgorithm) -> Policy {
    let mut policy = Policy::new("benchmark-policy", algorithm).unwrap();

    for i in 0..num_rules {
        let rule = Rule::new(format!("rule{}", i), Effect::Deny)
            .unwrap()
            .constrain(AttributeCategory::Method, ["ingest", "purgeObject"])
            .unwrap()
            .constrain(AttributeCategory::UserId, [format!("user{}", i)])
            .unwrap()
            .constrain(AttributeCategory::Role, [format!("role{}", i), "admin".to_string()])
            .unwrap();
        policy.add_rule(rule).unwrap();
    }

    policy
}

fn request_for(user: &str) -> Request {
    Request::new()
        .method("ingest")
        .unwrap()
        .user(user)
        .unwrap()
        .roles_from(["guest", "member"])
        .unwrap()
}

fn benchmark_policy_evaluation(c: &mut Criterion) {
    for size in [10usize, 100, 1000] {
        let policy = create_test_policy(size, CombiningAlgorithm::FirstApplicable);
        let hit = request_for(&format!("user{}", size / 2));
        let miss = request_for("nobody");

        c.bench_function(&format!("policy_eval_{}_rules", size), |b| {
            b.iter(|| evaluate(black_box(&policy), black_box(&hit)));
        });

        c.bench_function(&format!("policy_eval_{}_rules_no_match", size), |b| {
            b.iter(|| evaluate(black_box(&policy), black_box(&miss)));
        });
    }

    let policy = create_test_policy(100, CombiningAlgorithm::DenyOverrides);
    let request = request_for("user50");
    c.bench_function("policy_eval_100_rules_deny_overrides", |b| {
        b.iter(|| evaluate(black_box(&policy), black_box(&request)));
    });
}

fn benchmark_policy_conversion(c: &mut Criterion) {
    let policy = create_test_policy(100, CombiningAlgorithm::FirstApplicable);
    let dialect = Dialect::default();
    let tree = to_interchange(&policy, &dialect);

    c.bench_function("policy_to_interchange_100_rules", |b| {
        b.iter(|| to_interchange(black_box(&policy), &dialect));
    });

    c.bench_function("policy_from_interchange_100_rules", |b| {
        b.iter(|| from_interchange(black_box(&tree), &dialect).unwrap());
    });

    c.bench_function("policy_add_rule", |b| {
        b.iter(|| {
            let mut policy = Policy::new("test", CombiningAlgorithm::FirstApplicable).unwrap();
            policy
                .add_rule(black_box(Rule::new("r", Effect::Permit).unwrap()))
                .unwrap();
            policy
        });
    });
}

criterion_group!(
    benches,
    benchmark_policy_evaluation,
    benchmark_policy_conversion
);
criterion_main!(benches);
