//! Vocal technique ids reported by the Ai scoring firmware.

use strum::{Display, EnumCount, FromRepr, IntoStaticStr};

/// Label used for ids the firmware reports but the table does not know
pub const UNKNOWN_TECHNIQUE: &str = "不明な技";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr, Display, EnumCount,
)]
#[repr(u8)]
pub enum Technique {
    #[strum(serialize = "しゃくり")]
    Shakuri = 0x00,
    #[strum(serialize = "大しゃくり")]
    LargeShakuri = 0x01,
    #[strum(serialize = "早いしゃくり")]
    QuickShakuri = 0x02,
    #[strum(serialize = "早いしゃくり(強)")]
    QuickShakuriStrong = 0x03,
    #[strum(serialize = "L字アクセント")]
    LAccent = 0x04,
    #[strum(serialize = "L字アクセント(強)")]
    LAccentStrong = 0x05,
    #[strum(serialize = "V字アクセント")]
    VAccent = 0x06,
    #[strum(serialize = "V字アクセント(谷切れ)")]
    VAccentValleyBreak = 0x07,
    #[strum(serialize = "V字アクセント(下から)")]
    VAccentFromBelow = 0x08,
    #[strum(serialize = "逆V字アクセント")]
    InvertedVAccent = 0x09,
    #[strum(serialize = "こぶし(先頭)")]
    KobushiHead = 0x0a,
    #[strum(serialize = "こぶし(中間)")]
    KobushiMiddle = 0x0b,
    #[strum(serialize = "フライダウン")]
    FlyDown = 0x0c,
    #[strum(serialize = "ハンマリング・オン")]
    HammerOn = 0x0d,
    #[strum(serialize = "プリング・オフ")]
    PullOff = 0x0e,
    #[strum(serialize = "上昇ポルタメント")]
    RisingPortamento = 0x0f,
    #[strum(serialize = "下降ポルタメント")]
    FallingPortamento = 0x10,
    // 0x11 is not assigned
    #[strum(serialize = "フォール")]
    Fall = 0x12,
    #[strum(serialize = "早いフォール")]
    QuickFall = 0x13,
    #[strum(serialize = "ヒーカップ")]
    Hiccup = 0x14,
    #[strum(serialize = "フォール付きヒーカップ")]
    HiccupWithFall = 0x15,
    #[strum(serialize = "スロウダウン")]
    SlowDown = 0x16,
    #[strum(serialize = "スライダー")]
    Slider = 0x17,
    #[strum(serialize = "水平")]
    Level = 0x18,
    #[strum(serialize = "スタッカート")]
    Staccato = 0x19,
    #[strum(serialize = "U形")]
    UShape = 0x1a,
    #[strum(serialize = "逆U形")]
    InvertedUShape = 0x1b,
    #[strum(serialize = "への字形")]
    HeShape = 0x1c,
    #[strum(serialize = "アーチ形")]
    ArchShape = 0x1d,
    #[strum(serialize = "特殊ビブラート30")]
    SpecialVibrato30 = 0x1e,
    #[strum(serialize = "特殊ビブラート31")]
    SpecialVibrato31 = 0x1f,
    #[strum(serialize = "特殊ビブラート32")]
    SpecialVibrato32 = 0x20,
    #[strum(serialize = "ビブラート33")]
    Vibrato33 = 0x21,
    #[strum(serialize = "ビブラート34")]
    Vibrato34 = 0x22,
    #[strum(serialize = "ビブラート35")]
    Vibrato35 = 0x23,
    #[strum(serialize = "ビブラート36")]
    Vibrato36 = 0x24,
    #[strum(serialize = "ビブラート37")]
    Vibrato37 = 0x25,
    #[strum(serialize = "ビブラート38")]
    Vibrato38 = 0x26,
    #[strum(serialize = "ジャストヒット")]
    JustHit = 0x27,
    #[strum(serialize = "エッジボイス")]
    EdgeVoice = 0x28,
    #[strum(serialize = "フォールエッジ")]
    FallEdge = 0x29,
    #[strum(serialize = "逆こぶし")]
    ReverseKobushi = 0x2a,
    #[strum(serialize = "歌い回しなし")]
    NoTechnique = 0x2b,
}

impl Technique {
    pub fn from_id(id: u64) -> Option<Self> {
        u8::try_from(id).ok().and_then(Self::from_repr)
    }

    pub fn label(&self) -> &'static str {
        self.into()
    }
}

/// Resolve a technique id to its display label.
///
/// Never fails: ids outside the table map to [`UNKNOWN_TECHNIQUE`].
pub fn technique_label(id: u64) -> &'static str {
    Technique::from_id(id).map_or(UNKNOWN_TECHNIQUE, |t| t.label())
}
