//! Built-in content: the default three-stage lesson template, sample debate topics
//! and the printable teacher resources.

use serde::Serialize;

use crate::domain::{Activity, StageSection, Stages};

/// Sample motions used when a draft is requested without a topic.
pub const SAMPLE_TOPICS: &[&str] = &[
  "초등학교에 휴대폰을 가지고 와야 한다",
  "초등학생의 SNS 사용은 제한해야 한다",
  "급식에 채식 메뉴가 더 많아져야 한다",
  "학교에서 교복을 입어야 한다",
  "학생들에게 일정 금액의 용돈이 필요하다",
  "반려동물은 공동주택에서 키워도 된다",
  "학교에서 영어 과목은 필수여야 한다",
  "초등학생에게 숙제를 내야 한다",
  "쓰레기 종량제는 필요하다",
  "일회용 비닐봉지는 사용을 금지해야 한다",
];

pub const GRADE_OPTIONS: &[&str] = &[
  "1-2학년", "3-4학년", "5-6학년",
  "1학년", "2학년", "3학년", "4학년", "5학년", "6학년",
];

pub const SUBJECT_OPTIONS: &[&str] = &[
  "국어", "사회", "과학", "도덕", "실과", "체육", "미술", "음악", "창의적 체험활동",
];

/// A printable handout or reference sheet from the resources library.
#[derive(Debug, Serialize)]
pub struct Resource {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  pub sections: &'static [ResourceSection],
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ResourceSection {
  pub heading: &'static str,
  /// Numbered list rather than bullets.
  pub ordered: bool,
  pub items: &'static [&'static str],
}

pub const RESOURCES: &[Resource] = &[
  Resource {
    id: "rules",
    title: "토론 규칙 및 예절",
    description: "경기초등토론교육모형에서 권장하는 토론 규칙 및 예절입니다.",
    sections: &[
      ResourceSection {
        heading: "기본 규칙",
        ordered: false,
        items: &[
          "상대방이 말할 때는 경청하고 끼어들지 않습니다.",
          "발언 시간을 지켜주세요.",
          "상대방의 의견을 존중하고, 인신공격을 하지 않습니다.",
          "감정적인 표현보다는 논리적인 근거를 바탕으로 의견을 제시합니다.",
          "다양한 의견을 수용하는 열린 마음을 가집니다.",
        ],
      },
      ResourceSection {
        heading: "토론 예절",
        ordered: false,
        items: &[
          "상대방의 말을 주의 깊게 들으며 메모합니다.",
          "발언권을 얻은 후 말합니다.",
          "상대방의 발언 중에는 고개를 끄덕이거나 적절한 반응을 보여줍니다.",
          "상대방 의견의 좋은 점을 인정하고, 비판할 때는 예의를 갖춥니다.",
          "토론이 끝난 후에는 서로 격려하고 감사의 인사를 나눕니다.",
        ],
      },
    ],
    note: None,
  },
  Resource {
    id: "argument-template",
    title: "입론서 양식",
    description: "토론 준비를 위한 입론서 작성 양식입니다.",
    sections: &[ResourceSection {
      heading: "입론서",
      ordered: false,
      items: &[
        "토론 주제:",
        "나의 입장: □ 찬성 □ 반대",
        "주장:",
        "근거 1:",
        "근거 2:",
        "근거 3:",
        "예상되는 반론과 그에 대한 대응:",
      ],
    }],
    note: Some("이 양식은 A4 용지로 인쇄하여 사용할 수 있습니다."),
  },
  Resource {
    id: "reflection-questions",
    title: "토론 후 성찰 질문",
    description: "토론 활동 후 학생들의 성찰을 돕는 질문 목록입니다.",
    sections: &[ResourceSection {
      heading: "성찰 질문",
      ordered: true,
      items: &[
        "토론 전과 비교하여 여러분의 생각이 어떻게 바뀌었나요?",
        "상대방의 의견 중 가장 설득력 있다고 생각한 부분은 무엇인가요?",
        "오늘 토론에서 가장 인상 깊었던 순간은 언제였나요?",
        "이번 토론을 통해 새롭게 알게 된 사실이나 관점은 무엇인가요?",
        "다양한 의견을 듣고 나서 절충안이나 새로운 해결책을 생각해볼 수 있나요?",
        "이 주제에 대해 더 알아보고 싶은 것이 있나요?",
        "다음 토론에서 더 잘하기 위해 개선하고 싶은 점은 무엇인가요?",
        "토론에서 배운 내용을 일상생활에 어떻게 적용할 수 있을까요?",
        "의견이 다른 사람들과 함께 살아가기 위해 필요한 태도는 무엇일까요?",
        "이 주제와 관련하여 우리 학급/학교/지역사회에서 할 수 있는 활동이 있을까요?",
      ],
    }],
    note: None,
  },
  Resource {
    id: "follow-up-activities",
    title: "토론 후속 활동 아이디어",
    description: "토론 주제에 대한 이해를 심화하고 실천으로 연결하는 후속 활동 아이디어입니다.",
    sections: &[
      ResourceSection {
        heading: "성찰형 활동",
        ordered: false,
        items: &[
          "토론 일기 쓰기: 토론 과정과 느낀 점을 정리",
          "마인드맵 만들기: 주제 관련 다양한 관점 시각화",
          "생각 변화 그래프: 토론 전/중/후 자신의 생각 변화 표현",
          "시나 시각 작품 만들기: 주제와 관련된 감정이나 생각 예술적 표현",
          "인터뷰: 주제에 대한 다양한 사람들의 의견 수집하기",
        ],
      },
      ResourceSection {
        heading: "사회 참여형 활동",
        ordered: false,
        items: &[
          "캠페인 기획하기: 주제 관련 인식 개선 캠페인 계획 및 실행",
          "포스터/카드뉴스 만들기: 주제 관련 정보 시각적 표현",
          "문제 해결 프로젝트: 주제 관련 실제 문제 해결 위한 프로젝트",
          "편지쓰기: 관련 기관이나 인물에게 의견 전달하는 편지",
          "지역사회 봉사활동: 주제와 연계된 봉사활동 기획 및 참여",
        ],
      },
    ],
    note: None,
  },
];

pub fn find_resource(id: &str) -> Option<&'static Resource> {
  RESOURCES.iter().find(|r| r.id == id)
}

fn activity(id: &str, title: &str, minutes: u32, description: &str, prompts: [&str; 3]) -> Activity {
  Activity {
    id: id.into(),
    title: title.into(),
    duration_minutes: minutes,
    description: description.into(),
    teacher_prompts: prompts.iter().map(|p| p.to_string()).collect(),
  }
}

/// Gyeonggi elementary debate model, three stages, base total 120 minutes.
pub fn default_stage_template() -> Stages {
  Stages {
    stage1: StageSection {
      id: "stage1".into(),
      title: "1단계: 다름과 마주하기".into(),
      activities: vec![
        activity("activity1-1", "질문으로 논제 만나기", 10,
          "사진/영상을 보고 자유롭게 질문을 만들어 발표합니다.",
          [
            "이 장면에서 무엇이 보이나요? 어떤 생각이 드나요?",
            "왜? 어떻게? 라는 질문으로 시작해보세요.",
            "찬반으로 나뉠 수 있는 질문을 생각해봅시다.",
          ]),
        activity("activity1-2", "핵심 쟁점 찾기", 10,
          "논제의 핵심 단어를 정의하고 찬반 의견의 핵심 쟁점을 찾습니다.",
          [
            "논제의 핵심 단어는 무엇인가요?",
            "이 단어의 의미를 어떻게 정의할 수 있을까요?",
            "찬성 측과 반대 측은 어떤 점에서 의견이 다를까요?",
          ]),
        activity("activity1-3", "자료 조사/분석", 15,
          "논제에 관한 자료를 찾고 분석합니다.",
          [
            "어떤 자료가 필요할까요?",
            "이 자료는 신뢰할 수 있나요? 출처는 어디인가요?",
            "찾은 자료는 어떤 주장을 뒷받침하나요?",
          ]),
        activity("activity1-4", "입론서 쓰기", 15,
          "자신의 주장과 근거를 정리하여 입론서를 작성합니다.",
          [
            "주장을 명확하게 작성했나요?",
            "주장을 뒷받침하는 근거는 무엇인가요?",
            "상대방의 반박을 예상해볼까요?",
          ]),
      ],
    },
    stage2: StageSection {
      id: "stage2".into(),
      title: "2단계: 다름을 이해하기".into(),
      activities: vec![
        activity("activity2-1", "토론 여는 주장하기", 10,
          "찬성 측과 반대 측이 각각 첫 주장을 발표합니다.",
          [
            "먼저 찬성 측의 주장을 들어볼까요?",
            "이제 반대 측의 주장을 들어보겠습니다.",
            "다른 모둠에서는 경청하는 자세로 들어주세요.",
          ]),
        activity("activity2-2", "협의 시간", 5,
          "상대측 주장을 듣고 팀원들과 의견을 나눕니다.",
          [
            "상대측 주장의 강점과 약점은 무엇인가요?",
            "어떤 질문을 하면 좋을까요?",
            "우리 주장을 강화할 수 있는 방법은?",
          ]),
        activity("activity2-3", "질의 및 반박하기", 15,
          "상대측에 질문하고 반박합니다.",
          [
            "상대방 주장의 어떤 부분이 의문이 드나요?",
            "증거나 근거가 부족한 부분은 어디인가요?",
            "존중하는 태도로 질문해주세요.",
          ]),
        activity("activity2-4", "협의 및 자유토론 시간", 10,
          "팀원들과 협의하고 자유롭게 토론합니다.",
          [
            "지금까지의 토론 내용을 정리해봅시다.",
            "우리 주장의 약점은 무엇이었나요?",
            "상대측의 어떤 의견이 타당하다고 생각하나요?",
          ]),
        activity("activity2-5", "공존을 향한 주장하기", 10,
          "상대방 의견을 존중하며 절충안을 제시합니다.",
          [
            "상대 의견 중 수용할 수 있는 부분은 무엇인가요?",
            "양측의 의견을 절충할 방안은 없을까요?",
            "서로의 다른 의견을 존중하면서 함께 살아가려면 어떻게 해야 할까요?",
          ]),
      ],
    },
    stage3: StageSection {
      id: "stage3".into(),
      title: "3단계: 다름과 공존하기".into(),
      activities: vec![
        activity("activity3-1", "토론 후 생각 나누기", 10,
          "토론을 통해 배운 점과 느낀 점을 나눕니다.",
          [
            "토론 전과 후에 생각이 어떻게 바뀌었나요?",
            "상대방의 의견 중 인상 깊었던 부분은 무엇인가요?",
            "다른 사람과 의견이 다를 때 어떻게 대화해야 할까요?",
          ]),
        activity("activity3-2", "성찰/사회 참여 활동 안내", 10,
          "토론 주제와 관련된 후속 활동을 안내합니다.",
          [
            "이 주제에 대해 더 알아보고 싶은 것이 있나요?",
            "우리 교실이나 학교에서 실천할 수 있는 일은 무엇이 있을까요?",
            "이 문제 해결을 위해 우리가 할 수 있는 일은 무엇일까요?",
          ]),
      ],
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn default_template_shape() {
    let t = default_stage_template();
    assert_eq!(t.stage1.total_minutes(), 50);
    assert_eq!(t.stage2.total_minutes(), 50);
    assert_eq!(t.stage3.total_minutes(), 20);
    assert_eq!(t.total_minutes(), 120);
    assert_eq!(t.activity_count(), 11);
  }

  #[test]
  fn activity_ids_are_unique() {
    let t = default_stage_template();
    let ids: HashSet<&str> = t.iter().flat_map(|s| s.activities.iter().map(|a| a.id.as_str())).collect();
    assert_eq!(ids.len(), t.activity_count());
  }

  #[test]
  fn resources_have_unique_ids_and_content() {
    let ids: HashSet<&str> = RESOURCES.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 4);
    assert!(RESOURCES.iter().all(|r| !r.sections.is_empty() && r.sections.iter().all(|s| !s.items.is_empty())));
    assert_eq!(find_resource("reflection-questions").map(|r| r.sections[0].items.len()), Some(10));
    assert!(find_resource("missing").is_none());
  }
}
