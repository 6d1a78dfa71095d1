use crate::core::algebra::{signature_channels, TensorAlgebraLayout};
use crate::core::error::LogsigError;

#[test]
fn 레이아웃_오프셋_테스트() {
    let layout = TensorAlgebraLayout::new(2, 3).unwrap();

    assert_eq!(layout.level_size(0), 1);
    assert_eq!(layout.level_size(3), 8);
    assert_eq!(layout.full_len(), 15);
    assert_eq!(layout.signature_channels(), 14);
    assert_eq!(layout.level_range(0), 0..1);
    assert_eq!(layout.level_range(2), 3..7);
    assert_eq!(layout.signature_level_range(1), 0..2);
    assert_eq!(layout.signature_level_range(3), 6..14);
}

#[test]
fn 단어_위치_테스트() {
    let layout = TensorAlgebraLayout::new(3, 3).unwrap();

    assert_eq!(layout.word_index(&[2]), 2);
    assert_eq!(layout.word_index(&[1, 2]), 5);
    assert_eq!(layout.word_index(&[2, 0, 1]), 19);
    // 레벨 2 는 시그니처 좌표 3 부터, 레벨 3 은 12 부터
    assert_eq!(layout.word_position(&[0, 0]), 3);
    assert_eq!(layout.word_position(&[2, 0, 1]), 12 + 19);
}

#[test]
fn 시그니처_채널_수_테스트() {
    assert_eq!(signature_channels(1, 5).unwrap(), 5);
    assert_eq!(signature_channels(3, 4).unwrap(), 3 + 9 + 27 + 81);
    assert_eq!(signature_channels(4, 1).unwrap(), 4);
}

#[test]
fn 잘못된_설정은_에러() {
    assert!(matches!(
        TensorAlgebraLayout::new(0, 3),
        Err(LogsigError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        TensorAlgebraLayout::new(3, 0),
        Err(LogsigError::InvalidConfiguration(_))
    ));
    // usize 오버플로
    assert!(TensorAlgebraLayout::new(1 << 20, 8).is_err());
}
