use orchard::{
    lsystem::{generate, validate, Grammar, RuleSet},
    LSystemError, Species, SpeciesProfile,
};

const CONSTANTS: [char; 2] = ['[', ']'];
const VARIABLES: [char; 2] = ['0', '1'];

fn apple_rules() -> RuleSet {
    RuleSet::from_pairs([('1', "11"), ('0', "1[0]0")])
}

#[test]
fn zeroth_and_first_generation_for_every_preset() {
    for species in Species::ALL {
        let grammar = SpeciesProfile::preset(species).grammar;
        let mut rules = grammar.rules.clone();
        let zeroth = generate("0", &mut rules, &CONSTANTS, &VARIABLES, 0).unwrap();
        let first = generate("0", &mut rules, &CONSTANTS, &VARIABLES, 1).unwrap();
        assert_eq!(zeroth, "0");
        assert_eq!(Some(first.as_str()), grammar.rules.get('0'));
    }
}

#[test]
fn apple_fourth_generation_matches_fixture() {
    let mut rules = apple_rules();
    let out = generate("0", &mut rules, &CONSTANTS, &VARIABLES, 4).unwrap();
    assert_eq!(
        out,
        "11111111[1111[11[1[0]0]1[0]0]11[1[0]0]1[0]0]1111[11[1[0]0]1[0]0]11[1[0]0]1[0]0"
    );
}

#[test]
fn tip_counts_follow_branching_factor() {
    let apple = SpeciesProfile::apple().grammar.generate(6).unwrap();
    let pear = SpeciesProfile::pear().grammar.generate(6).unwrap();
    let plum = SpeciesProfile::plum().grammar.generate(6).unwrap();
    assert_eq!(apple.matches('0').count(), 64);
    assert_eq!(pear.matches('0').count(), 64);
    assert_eq!(plum.matches('0').count(), 729);
    assert_eq!(
        SpeciesProfile::plum().grammar.generate(2).unwrap(),
        "11[1[0][0]0][1[0][0]0]1[0][0]0"
    );
}

#[test]
fn brackets_stay_balanced() {
    for species in Species::ALL {
        let structure = SpeciesProfile::preset(species).grammar.generate(8).unwrap();
        let mut depth: i64 = 0;
        for c in structure.chars() {
            match c {
                '[' => depth += 1,
                ']' => depth -= 1,
                _ => {}
            }
            assert!(depth >= 0, "{species} closes a branch it never opened");
        }
        assert_eq!(depth, 0);
    }
}

#[test]
fn missing_variable_rule_is_rejected() {
    let mut rules = RuleSet::from_pairs([('0', "1[0]0")]);
    assert_eq!(
        validate(&mut rules, &CONSTANTS, &VARIABLES, Some("0")),
        Err(LSystemError::MissingVariableRule { symbol: '1' })
    );
}

#[test]
fn constants_receive_identity_rules_and_pass() {
    let mut rules = apple_rules();
    assert!(!rules.contains('['));
    validate(&mut rules, &CONSTANTS, &VARIABLES, Some("0")).unwrap();
    assert_eq!(rules.get('['), Some("["));
    assert_eq!(rules.get(']'), Some("]"));
}

#[test]
fn rules_edited_between_calls_are_rechecked() {
    let mut rules = apple_rules();
    generate("0", &mut rules, &CONSTANTS, &VARIABLES, 3).unwrap();

    rules.remove('[');
    // identity rule for the constant comes back on the next call
    generate("0", &mut rules, &CONSTANTS, &VARIABLES, 3).unwrap();
    assert!(rules.contains('['));

    rules.insert('1', "1X");
    assert_eq!(
        generate("0", &mut rules, &CONSTANTS, &VARIABLES, 3),
        Err(LSystemError::UnresolvedProductionSymbol {
            rule: '1',
            symbol: 'X'
        })
    );
}

#[test]
fn grammar_deserializes_from_yaml() {
    let yaml = r#"
axiom: "0"
constants: ["[", "]"]
variables: ["0", "1"]
rules:
  "0": "1[0]0"
  "1": "11"
"#;
    let grammar: Grammar = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(grammar, SpeciesProfile::apple().grammar);
}
