use proptest::prelude::*;
use shader_forge::container::escape_control_chars_in_strings;
use shader_forge::decode_container;
use shader_forge::repair::{
    GlslType, RepairOptions, RepairReport, RepairState, repair_shader_code, strip_comments,
};
use shader_forge::repair::loops::preinitialize_loop_variables;

fn float_type() -> impl Strategy<Value = GlslType> {
    prop_oneof![
        Just(GlslType::Float),
        Just(GlslType::Vec2),
        Just(GlslType::Vec3),
        Just(GlslType::Vec4),
    ]
}

fn one_of(ty: GlslType) -> String {
    match ty {
        GlslType::Float => "1.0".to_string(),
        other => format!("{}(1.0)", other.keyword()),
    }
}

proptest! {
    #[test]
    fn escaped_code_decodes_back_to_the_raw_text(
        code in "[a-z0-9 ;(){}=.\n\r\t]{0,64}"
    ) {
        let raw = format!("{{\"passes\":[{{\"code\":\"{code}\",\"type\":\"image\"}}]}}");
        let escaped = escape_control_chars_in_strings(raw.as_bytes());
        prop_assert!(escaped.iter().all(|&b| b >= 0x20));

        let container = decode_container(raw.as_bytes()).expect("decode");
        prop_assert_eq!(&container.passes[0].code, &code);
    }

    #[test]
    fn trailing_line_comments_do_not_change_stripped_text(
        lines in prop::collection::vec("[a-z0-9 ;=.]{0,24}", 1..8),
        note in "[a-z ]{0,16}"
    ) {
        let plain = lines.join("\n");
        let commented = lines
            .iter()
            .map(|l| format!("{l}//{note}"))
            .collect::<Vec<_>>()
            .join("\n");
        let stripped = strip_comments(&commented);
        prop_assert_eq!(&stripped, &strip_comments(&plain));
        prop_assert_eq!(strip_comments(&stripped), stripped);
    }

    #[test]
    fn chain_tail_takes_the_zero_of_the_line_type(
        ty in float_type(),
        head in "[a-z]{1,5}",
        tail in "[a-z]{1,5}"
    ) {
        let head = format!("h_{head}");
        let tail = format!("t_{tail}");
        let init = one_of(ty);
        let src = format!("{ty} {head} = {init}, {tail};\n{head} += {tail};");

        let out = repair_shader_code(&src);
        prop_assert_eq!(
            out,
            format!("{ty} {head} = {init}, {tail} = {};\n{head} += {tail};", ty.zero_value())
        );
    }

    #[test]
    fn each_loop_variable_is_initialized_once(
        names in prop::collection::btree_set("[a-z]{1,4}", 1..5),
        ty in float_type()
    ) {
        let names: Vec<String> = names.into_iter().map(|n| format!("acc_{n}")).collect();
        let mut state = RepairState::default();
        for name in &names {
            state.record(name, ty);
        }
        let decls = names
            .iter()
            .map(|n| format!("    {ty} {n};\n"))
            .collect::<String>();
        let body = names
            .iter()
            .map(|n| format!("        {n} += {};\n", one_of(ty)))
            .collect::<String>();
        let code = format!("void f() {{\n{decls}    for(int i = 0; i < 3; i++) {{\n{body}    }}\n}}");

        let mut report = RepairReport::default();
        let out = preinitialize_loop_variables(&code, &RepairOptions::default(), &state, &mut report);

        prop_assert_eq!(report.loop_inits_inserted, names.len());
        for name in &names {
            let init = format!("    {name} = {};\n", ty.zero_value());
            prop_assert_eq!(out.matches(&init).count(), 1);
            prop_assert!(out.find(&init).unwrap() < out.find("for(").unwrap());
        }
    }

    #[test]
    fn builtin_only_initializers_survive(
        name in "[a-z]{1,6}",
        func in prop::sample::select(vec!["sin", "cos", "fract", "abs", "sqrt"]),
        uniform in prop::sample::select(vec!["iTime", "iTimeDelta", "iFrameRate"])
    ) {
        let line = format!("float v_{name} = {func}({uniform}) * 0.5;");
        let out = repair_shader_code(&line);
        prop_assert_eq!(out, line);
    }

    #[test]
    fn entry_output_is_never_redeclared(
        indent in "[ \t]{0,8}",
        r in 0u8..10,
        g in 0u8..10
    ) {
        let src = format!(
            "void mainImage(out vec4 fragColor, in vec2 fragCoord)\n{{\n{indent}vec4 fragColor = vec4(0.{r}, 0.{g}, 0.0, 1.0);\n}}"
        );
        let out = repair_shader_code(&src);
        prop_assert!(!out.contains("vec4 fragColor ="));
        let expected = format!("{indent}fragColor = vec4(0.{r}, 0.{g}, 0.0, 1.0);");
        prop_assert!(out.contains(&expected));
    }
}
