//! Institution name normalisation.
//!
//! Graduate-program extracts name a school by its graduate division
//! (`한국과학기술원 일반대학원`) while the university table holds the
//! decorated display name (`카이스트(KAIST/한국과학기술원)`). [`NameNormalizer`]
//! maps the former to the latter so the result can be used as a join key
//! into the university name index.
//!
//! Matching is exact and case-sensitive; there is no fuzzy matching. A name
//! that is not recognised passes through unchanged.

use std::{collections::HashMap, sync::LazyLock};

/// Marker that a school name refers to a graduate division.
const GRADUATE_MARKER: &str = "대학원";

/// Graduate-division suffixes stripped from school names. Removal is plain
/// substring replacement applied in list order.
const GRADUATE_SUFFIXES: &[&str] = &[
  " 일반대학원",
  " 특수대학원",
  " 산업대학원",
  " 전문대학원",
  " 경영대학원",
  " 교육대학원",
  " 행정대학원",
  " 공학대학원",
  " 보건대학원",
  " 의료대학원",
  " 문화대학원",
  " 예술대학원",
  " 신학대학원",
  " 법무대학원",
  " 경찰대학원",
  " 정보대학원",
  " 미디어대학원",
  " 국제대학원",
  " 환경대학원",
  " 융합대학원",
  " 창업대학원",
  " 복지대학원",
  " 상담대학원",
  " 치료대학원",
  " 스포츠대학원",
  " 항공대학원",
  " 해사대학원",
  " 철도대학원",
  " 교통대학원",
  " 물류대학원",
  " 보안대학원",
  " 정책대학원",
  " 공공대학원",
  " 기술대학원",
  " 과학대학원",
  " 의료보건대학원",
  " 사회복지대학원",
  " 문화예술대학원",
  " 글로벌대학원",
  " 융복합대학원",
  " 미래융합대학원",
  " 창의융합대학원",
  " 산업융합대학원",
  " 정보융합대학원",
  " 스마트융합대학원",
  " AI대학원",
  " 데이터사이언스대학원",
  " 메타버스전문대학원",
  " IT융합대학원",
  " 보건복지대학원",
  " 휴먼서비스대학원",
  " 사회문화대학원",
  " 경영행정대학원",
  " 산업과학대학원",
  " 정보통신대학원",
  " 소프트웨어융합대학원",
  " 문화유산전문대학원",
  " 미래문화유산대학원",
  " 산업복지대학원",
  " 교통ITS대학원",
  " 동북아물류대학원",
  " 의료보건산업대학원",
  " 사회적경제경영대학원",
  " 산업・경영대학원",
  " 글로컬휴먼대학원",
  " 정보산업대학원",
  " 공공안전정책대학원",
  " 경영행정복지대학원",
  " 군사경찰행정대학원",
  " 특수치료대학원",
  " 한방산업대학원",
  " 보건・복지대학원",
  " 융합기술에너지대학원",
  " 휴먼산업대학원",
  " 상담・산업대학원",
  " 문화관광복지대학원",
  " 철도융합대학원",
  " 정신분석대학원",
  " 산업정보대학원",
  " 상담치료대학원",
  " 보건과학대학원",
  " 정경대학원",
  " 아트퓨전디자인대학원",
  " 국제신학선교대학원",
  " 체육대학원",
  " 건설대학원",
  " 문화기술대학원",
  " 심리융합과학대학원",
  " 성경과교회대학원",
  " 정치행정언론대학원",
  " 사회과학대학원",
  " 건강증진대학원",
  " 사회복지카리타스대학원",
  " 휴먼케어융합대학원",
  " 공공정책대학원",
  " 통일대학원",
  " 교육정책전문대학원",
  " 행정전문대학원",
  " 융합과학대학원",
  " 임상간호대학원",
  " 미래재활복지대학원",
  " 글로벌리더십경영융합대학원",
  " 다문화교육복지대학원",
  " 식물방역대학원",
  " 문화전문대학원",
  " IT정책전문대학원",
  " 경영(전문)대학원",
  " 산업문화대학원",
  " 항공융합대학원",
  " 미래복지상담대학원",
  " 국방과학대학원",
  " 환경보건대학원",
  " 스포츠융복합대학원",
  " 시민평화대학원",
  " AI세무・회계대학원",
  " 기록정보과학전문대학원",
  " 원격대학원",
  " 교육서비스과학대학원",
  " 경영정책과학대학원",
  " 사회문화・행정복지대학원",
  " 복지산업대학원",
  " 산학협력대학원",
  " 법과학대학원",
  " 국제학대학원",
  " 경제대학원",
  " 문화예술경영대학원",
  " 정보보호대학원",
  " 글로벌지식경영대학원",
  " 저널리즘대학원",
  " 보건의료경영대학원",
  " 경영사회복지대학원",
  " 디자인대학원",
  " 행정법무대학원",
  " 경영문화대학원",
  " 휴먼텍대학원",
  " 물류전문대학원",
  " 경제통상대학원",
  " (WISE) 사회과학대학원",
  " (ERICA) 융합산업대학원",
  " (ERICA) 대학원",
  " (글로컬) 창의융합대학원",
  " (미래) 보건과학대학원",
  " (미래) 정경대학원",
  " (미래) 융합과학대학원",
  " (세종) 창업경영대학원",
  " (세종) 행정전문대학원",
  " (세종) 융합과학대학원",
];

/// Base institution name → canonical display name.
const ALIASES: &[(&str, &str)] = &[
  ("한국과학기술원", "카이스트(KAIST/한국과학기술원)"),
  ("울산과학기술원", "울산과학기술원(UNIST)"),
  ("광주과학기술원", "광주과학기술원(GIST)"),
  ("대구경북과학기술원", "대구경북과학기술원(DGIST)"),
  ("포항공과대학교", "포항공과대학교(POSTECH)"),
  ("서울대학교", "서울대학교(SNU)"),
  ("연세대학교", "연세대학교(YU)"),
  ("고려대학교", "고려대학교(KU)"),
  ("성균관대학교", "성균관대학교(SKKU)"),
  ("한양대학교", "한양대학교(HYU)"),
  ("경희대학교", "경희대학교(KHU)"),
  ("중앙대학교", "중앙대학교(CAU)"),
  ("서강대학교", "서강대학교(SGU)"),
  ("건국대학교", "건국대학교(KU)"),
  ("동국대학교", "동국대학교(DKU)"),
  ("국민대학교", "국민대학교(KMU)"),
  ("숭실대학교", "숭실대학교(SSU)"),
  ("단국대학교", "단국대학교(DKU)"),
  ("아주대학교", "아주대학교(AJU)"),
  ("인하대학교", "인하대학교(INHA)"),
  ("전남대학교", "전남대학교(JNU)"),
  ("전북대학교", "전북대학교(JBNU)"),
  ("충남대학교", "충남대학교(CNU)"),
  ("충북대학교", "충북대학교(CBU)"),
  ("경북대학교", "경북대학교(KNU)"),
  ("부산대학교", "부산대학교(PNU)"),
  ("부경대학교", "부경대학교(PKNU)"),
  ("경상국립대학교", "경상국립대학교(GNU)"),
  ("제주대학교", "제주대학교(JJU)"),
  ("강원대학교", "강원대학교(KNU)"),
  ("강릉원주대학교", "강릉원주대학교(GWNU)"),
  ("공주대학교", "공주대학교(KNU)"),
  ("순천향대학교", "순천향대학교(SCH)"),
  ("상명대학교", "상명대학교(SMU)"),
  ("명지대학교", "명지대학교(MJU)"),
  ("세종대학교", "세종대학교(SJU)"),
  ("홍익대학교", "홍익대학교(HIU)"),
  ("광운대학교", "광운대학교(KWU)"),
  ("한림대학교", "한림대학교(HU)"),
  ("원광대학교", "원광대학교(WKU)"),
  ("전주대학교", "전주대학교(JJU)"),
  ("목포대학교", "목포대학교(MPU)"),
  ("군산대학교", "군산대학교(KSU)"),
  ("조선대학교", "조선대학교(CSU)"),
  ("동아대학교", "동아대학교(DU)"),
  ("부산가톨릭대학교", "부산가톨릭대학교(PCU)"),
  ("대구가톨릭대학교", "대구가톨릭대학교(DCU)"),
  ("가톨릭대학교", "가톨릭대학교(CU)"),
  ("가톨릭관동대학교", "가톨릭관동대학교(CGU)"),
  ("대구한의대학교", "대구한의대학교(DHU)"),
  ("한의대학교", "한의대학교(KHU)"),
  ("대구대학교", "대구대학교(DGU)"),
  ("대구교육대학교", "대구교육대학교(DGUE)"),
  ("서울교육대학교", "서울교육대학교(SNUE)"),
  ("경인교육대학교", "경인교육대학교(GINUE)"),
  ("부산교육대학교", "부산교육대학교(BNUE)"),
  ("전주교육대학교", "전주교육대학교(JNUE)"),
  ("공주교육대학교", "공주교육대학교(KNUE)"),
  ("청주교육대학교", "청주교육대학교(CJUE)"),
  ("진주교육대학교", "진주교육대학교(JNUE)"),
  ("광주교육대학교", "광주교육대학교(GNUE)"),
  ("부산외국어대학교", "부산외국어대학교(BUFS)"),
  ("한국외국어대학교", "한국외국어대학교(HUFS)"),
  ("한국해양대학교", "한국해양대학교(KMU)"),
  ("한국항공대학교", "한국항공대학교(KAU)"),
  ("한국교원대학교", "한국교원대학교(KNUE)"),
  ("한국기술교육대학교", "한국기술교육대학교(KOREATECH)"),
  ("한국공학대학교", "한국공학대학교(KUT)"),
  ("한국전통문화대학교", "한국전통문화대학교(KNUCH)"),
  ("한국에너지공과대학교", "한국에너지공과대학교(KENTECH)"),
  ("한국방송통신대학교", "한국방송통신대학교(KNOU)"),
  ("한국체육대학교", "한국체육대학교(KNSU)"),
  ("한국예술종합학교", "한국예술종합학교(KARTS)"),
  ("한국예술대학교", "한국예술대학교(KARTS)"),
  ("한국영화아카데미", "한국영화아카데미(KAFA)"),
];

static BUILTIN_ALIASES: LazyLock<HashMap<&'static str, &'static str>> =
  LazyLock::new(|| ALIASES.iter().copied().collect());

/// Canonicalises free-text institution names.
///
/// The built-in alias table is shared and immutable; extra aliases (from the
/// loader configuration) are layered on top and win over built-in entries.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
  extra: HashMap<String, String>,
}

impl NameNormalizer {
  /// A normaliser using only the built-in alias table.
  pub fn new() -> Self { Self::default() }

  /// A normaliser with additional `base name → canonical name` aliases.
  pub fn with_aliases(
    aliases: impl IntoIterator<Item = (String, String)>,
  ) -> Self {
    Self { extra: aliases.into_iter().collect() }
  }

  /// Normalise `raw` to its canonical key.
  ///
  /// Returns `None` when the name is empty or only whitespace, before or
  /// after suffix stripping.
  pub fn normalize(&self, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return None;
    }

    let base = if trimmed.contains(GRADUATE_MARKER) {
      strip_graduate_suffixes(trimmed)
    } else {
      trimmed.to_owned()
    };
    let base = base.trim();
    if base.is_empty() {
      return None;
    }

    Some(self.alias_for(base).unwrap_or(base).to_owned())
  }

  /// Exact-match alias lookup.
  pub fn alias_for(&self, base: &str) -> Option<&str> {
    self
      .extra
      .get(base)
      .map(String::as_str)
      .or_else(|| BUILTIN_ALIASES.get(base).copied())
  }
}

/// Normalise `raw` with the built-in alias table only.
pub fn normalize(raw: &str) -> Option<String> {
  NameNormalizer::new().normalize(raw)
}

fn strip_graduate_suffixes(name: &str) -> String {
  GRADUATE_SUFFIXES
    .iter()
    .fold(name.to_owned(), |acc, suffix| acc.replace(suffix, ""))
}
