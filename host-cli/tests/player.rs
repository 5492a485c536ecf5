//! # 播放会话集成测试
//!
//! 测试 Player → Runtime / TextReveal / AudioController / 存档 的整条链路。
//! 音频使用日志引擎，存档写入临时目录。

use std::time::Duration;

use novel_cli::{
    AudioEvent, ClickOutcome, FileSaveStore, LoadOutcome, Player, PlayerError, PlayerOptions,
    TracingAudioEngine, parse_novel, render_frame,
};
use novel_runtime::{MemorySaveStore, Novel, PlaybackCursor, SaveStore, WaitingReason};

const DEMO: &str = include_str!("../assets/demo_novel.json");

fn demo() -> Novel {
    parse_novel(DEMO).unwrap()
}

fn options(animate: bool) -> PlayerOptions {
    PlayerOptions {
        chars_per_second: 33.0,
        animate,
        fade_out: Duration::from_millis(1500),
    }
}

fn memory_player(animate: bool) -> Player<TracingAudioEngine, MemorySaveStore> {
    let novel = demo();
    let engine = TracingAudioEngine::for_novel(&novel);
    Player::start(novel, &options(animate), engine, MemorySaveStore::new()).unwrap()
}

fn file_player(dir: &std::path::Path) -> Player<TracingAudioEngine, FileSaveStore> {
    let novel = demo();
    let engine = TracingAudioEngine::for_novel(&novel);
    Player::start(novel, &options(false), engine, FileSaveStore::new(dir)).unwrap()
}

/// 测试点击先显示全部文本，再推进
#[test]
fn test_click_reveals_before_advancing() {
    let mut player = memory_player(true);
    assert_eq!(player.runtime().cursor(), &PlaybackCursor::new("opening", 3));
    assert!(player.is_revealing());
    assert!(!player.can_advance());

    assert_eq!(player.click().unwrap(), ClickOutcome::RevealedAll);
    assert_eq!(player.runtime().cursor().node_index, 3);
    assert!(player.can_advance());

    assert_eq!(player.click().unwrap(), ClickOutcome::Advanced);
    assert_eq!(player.runtime().cursor().node_index, 4);
    assert!(player.is_revealing());

    // 时间足够长时文本自然显示完
    player.tick(10.0);
    assert!(!player.is_revealing());
    assert!(player.can_advance());
}

/// 测试跳回同一场景同一节点也算推进
#[test]
fn test_jump_back_to_same_line_restarts_reveal() {
    let novel = parse_novel(
        r#"{
            "id": "loop", "title": "循环",
            "audio": [{ "id": "bgm", "name": "主题", "type": "bgm" }],
            "chapters": [{ "id": "c", "title": "c", "scenes": [
                { "id": "a", "name": "A", "nodes": [
                    { "id": "n0", "type": "audio", "audioId": "bgm", "action": "play" },
                    { "id": "n1", "type": "narration", "text": "又是一天" },
                    { "id": "n2", "type": "jump", "targetSceneId": "a" }
                ] }
            ] }],
            "startSceneId": "a"
        }"#,
    )
    .unwrap();
    let engine = TracingAudioEngine::for_novel(&novel);
    let mut player =
        Player::start(novel, &options(true), engine, MemorySaveStore::new()).unwrap();

    player.tick(10.0);
    assert!(!player.is_revealing());
    let cursor = player.runtime().cursor().clone();

    assert_eq!(player.click().unwrap(), ClickOutcome::Advanced);
    assert_eq!(player.runtime().cursor(), &cursor);
    assert!(player.is_revealing());
    assert_eq!(player.runtime().history().line_count(), 2);
}

/// 测试选项只在提问显示完后可用
#[test]
fn test_choices_wait_for_prompt() {
    let mut player = memory_player(true);
    for _ in 0..3 {
        player.tick(10.0);
        player.click().unwrap();
    }
    assert_eq!(player.runtime().cursor().node_index, 8);
    assert!(player.runtime().waiting().is_choice());

    assert!(!player.choices_visible());
    assert!(matches!(
        player.choose_index(0),
        Err(PlayerError::ChoicesHidden)
    ));

    player.tick(10.0);
    assert!(player.choices_visible());
    assert!(!player.can_advance());
    // 选择节点上点击不会离开
    assert_eq!(player.click().unwrap(), ClickOutcome::Stayed);
    assert!(matches!(
        player.choose_index(5),
        Err(PlayerError::InvalidChoice { index: 5, count: 2 })
    ));

    player.choose_index(0).unwrap();
    assert_eq!(
        player.runtime().cursor(),
        &PlaybackCursor::new("living-room", 3)
    );
}

/// 测试完整路线中的音频
#[test]
fn test_audio_through_living_room_route() {
    let mut player = memory_player(false);
    assert_eq!(
        player.audio().engine().events(),
        &[AudioEvent::Loop("bgm-morning".to_string())]
    );

    player.click().unwrap();
    player.click().unwrap();
    assert!(
        player
            .audio()
            .engine()
            .events()
            .contains(&AudioEvent::OneShot("sfx-knock".to_string()))
    );
    let state = player.runtime().presentation();
    assert!(state.is_on_screen("bob"));

    player.click().unwrap();
    player.choose_index(0).unwrap();
    // 转场后音乐继续
    assert_eq!(player.runtime().current_bgm_id(), Some("bgm-morning"));

    player.click().unwrap();
    assert_eq!(player.runtime().cursor().node_index, 5);
    assert!(player.audio().is_fading());
    assert!(player.runtime().current_bgm_id().is_none());

    player.tick(2.0);
    assert!(!player.audio().is_fading());
    assert_eq!(
        player.audio().engine().events().last(),
        Some(&AudioEvent::Stop)
    );

    player.click().unwrap();
    assert_eq!(player.runtime().cursor(), &PlaybackCursor::new("ending", 1));
    assert!(player.runtime().is_finished());
    assert!(!player.can_advance());
    assert_eq!(player.runtime().waiting(), WaitingReason::WaitForClick);
}

/// 测试文件存档的保存与读取
#[test]
fn test_save_and_load_across_sessions() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = file_player(dir.path());
    assert!(!first.has_save());
    first.click().unwrap();
    first.click().unwrap();
    first.save().unwrap();
    assert!(dir.path().join("novel_save_demo.json").exists());

    let mut second = file_player(dir.path());
    assert!(second.has_save());
    assert_eq!(second.load().unwrap(), LoadOutcome::Loaded);

    assert_eq!(second.runtime().cursor(), first.runtime().cursor());
    assert_eq!(
        second.runtime().presentation(),
        first.runtime().presentation()
    );
    // 音效不会重新触发，BGM 已在播放所以也不会重新开始
    assert_eq!(
        second.audio().engine().events(),
        &[AudioEvent::Loop("bgm-morning".to_string())]
    );

    second.delete_save().unwrap();
    assert!(!second.has_save());
    assert_eq!(second.load().unwrap(), LoadOutcome::NoSave);
}

/// 测试损坏的存档按无存档处理
#[test]
fn test_malformed_save_is_no_save() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSaveStore::new(dir.path());
    store
        .set("novel_save_demo", "{ broken".to_string())
        .unwrap();

    let mut player = file_player(dir.path());
    let before = player.runtime().cursor().clone();
    assert_eq!(player.load().unwrap(), LoadOutcome::NoSave);
    assert_eq!(player.runtime().cursor(), &before);
}

/// 测试跳转到不存在的场景时保持原状
#[test]
fn test_jump_to_missing_scene_keeps_state() {
    let mut player = memory_player(false);
    let before = player.runtime().cursor().clone();

    assert!(matches!(
        player.jump("nowhere"),
        Err(PlayerError::Runtime(_))
    ));
    assert_eq!(player.runtime().cursor(), &before);

    player.jump("alone").unwrap();
    assert_eq!(player.runtime().cursor(), &PlaybackCursor::new("alone", 2));
    assert_eq!(
        player.audio().engine().events().last(),
        Some(&AudioEvent::Stop)
    );
}

/// 测试开场画面
#[test]
fn test_render_opening_frame() {
    let player = memory_player(false);
    insta::assert_snapshot!(render_frame(&player), @r"
    ── 开场 ──
    背景: 房间
    角色: 爱丽丝[左 happy]
    BGM: 清晨

    清晨的阳光照进房间。
    ▼
    ");
}
