use msgfmt::{gfm_to_rt, rt_to_gfm, GfmRenderOptions, Mode};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn integration_rt_round_trip_with_user_mention() {
    let input = json!({
        "type": "rich_text",
        "elements": [{
            "type": "rich_text_section",
            "elements": [
                {"type": "text", "text": "Hi "},
                {"type": "user", "user_id": "U1"}
            ]
        }]
    });

    let gfm = rt_to_gfm(&input, &GfmRenderOptions::default(), Mode::Strict).expect("rt_to_gfm failed");
    assert_eq!(gfm, "Hi [U1](slack://user?id=U1)");

    let rt = gfm_to_rt(&gfm, Mode::Strict).expect("gfm_to_rt failed");
    assert_eq!(rt, input, "RT round trip did not reach a fixed point");
}

#[test]
fn integration_code_block_trailing_newline_is_exactly_one() {
    let input = json!({
        "type": "rich_text",
        "elements": [{
            "type": "rich_text_preformatted",
            "elements": [{"type": "text", "text": "xyz\n"}]
        }]
    });

    let gfm = rt_to_gfm(&input, &GfmRenderOptions::default(), Mode::Strict).expect("rt_to_gfm failed");
    assert_eq!(gfm, "```\nxyz\n```");
}

#[test]
fn integration_id_mapping_then_render_produces_named_deep_link() {
    use msgfmt::{apply_id_map, parse_rich_text, render_gfm, IdNameMapper};
    use std::collections::HashMap;

    let input = json!({
        "type": "rich_text",
        "elements": [{
            "type": "rich_text_section",
            "elements": [{"type": "user", "user_id": "U1"}]
        }]
    });

    let doc = parse_rich_text(&input).expect("parse failed");
    let mut mapper = IdNameMapper {
        user_map: HashMap::from([("U1".to_string(), "john".to_string())]),
        ..Default::default()
    };
    let doc = apply_id_map(doc, &mut mapper);
    let options = GfmRenderOptions { team_id: Some("T9".to_string()) };
    let gfm = render_gfm(&doc, &options);

    assert_eq!(gfm, "[@john](slack://user?team=T9&id=U1&name=john)");
}

#[test]
fn integration_mk_broadcast_migrates_to_deep_link() {
    let gfm = msgfmt::mk_to_gfm("hello <!channel>", &GfmRenderOptions::default(), Mode::Strict)
        .expect("mk_to_gfm failed");
    assert_eq!(gfm, "hello [@channel](slack://broadcast?range=channel)");
}

#[test]
fn integration_mk_fence_strips_angle_brackets_around_url() {
    let gfm = msgfmt::mk_to_gfm(
        "```\n<https://example.com>\n```",
        &GfmRenderOptions::default(),
        Mode::Strict,
    )
    .expect("mk_to_gfm failed");
    assert_eq!(gfm, "```\nhttps://example.com\n```");
}

#[test]
fn integration_gfm_list_round_trips_through_rt() {
    let gfm = "- one\n- two";
    let rt = gfm_to_rt(gfm, Mode::Strict).expect("gfm_to_rt failed");
    let back = rt_to_gfm(&rt, &GfmRenderOptions::default(), Mode::Strict).expect("rt_to_gfm failed");
    assert_eq!(back, gfm);
}

#[test]
fn integration_best_effort_mode_degrades_unknown_rt_element_instead_of_erroring() {
    let bad = json!({"type": "rich_text", "elements": [{"type": "rich_text_bogus"}]});
    let out = rt_to_gfm(&bad, &GfmRenderOptions::default(), Mode::BestEffort).expect("best-effort should not error");
    assert!(out.contains("rich_text_bogus"));
}
