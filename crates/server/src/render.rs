//! Server-side HTML for the learner page and the teacher panel.

use server_api::{LearnerView, TeacherPanel, TeacherView};
use shared::{
    domain::{Property, Step},
    protocol::{LogEntry, Notice, NoticeLevel},
};

const TITLE: &str = "산-염기 탐구 실험실";

pub fn learner_page(view: &LearnerView) -> String {
    let mut body = String::new();
    body.push_str(&notices(&view.notices));

    match view.step {
        Step::Ready => body.push_str(&ready_section(view)),
        Step::Result => body.push_str(&result_section(view)),
        Step::Done => body.push_str(&notice(&Notice::info("실험을 초기화하는 중입니다..."))),
    }

    body.push_str("<hr>");
    body.push_str(&log_section(&view.log));
    body.push_str("<hr><p><a href=\"/teacher\">👩‍🏫 교사 관리 페이지</a></p>");

    // Round up so the reload never lands before the pause is over.
    let refresh = view.resume_in.map(|remaining| {
        let secs = remaining.as_millis().div_ceil(1000).max(1);
        format!("<meta http-equiv=\"refresh\" content=\"{secs}\">")
    });
    page(refresh.as_deref().unwrap_or_default(), &body)
}

pub fn teacher_page(view: &TeacherView) -> String {
    let mut body = String::from("<h2>👩‍🏫 교사 관리 페이지</h2>");
    match view {
        TeacherView::Disabled => {
            body.push_str(&notice(&Notice::info(
                "교사 관리 페이지가 설정되지 않았습니다.",
            )));
        }
        TeacherView::Locked { notice: gate } => {
            body.push_str(&secret_form());
            if let Some(gate) = gate {
                body.push_str(&notice(gate));
            }
        }
        TeacherView::Unlocked(panel) => {
            body.push_str(&notices(&panel.notices));
            body.push_str(&requests_tab(panel));
            body.push_str(&submissions_tab(panel));
        }
    }
    body.push_str("<hr><p><a href=\"/\">🧪 실험실로 돌아가기</a></p>");
    page("", &body)
}

fn page(head_extra: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"ko\"><head><meta charset=\"utf-8\">\
         <title>{TITLE}</title>{head_extra}</head>\
         <body><h1>🧪 {TITLE}</h1><hr>{body}</body></html>\n"
    )
}

fn ready_section(view: &LearnerView) -> String {
    let solutions: String = view
        .solutions
        .iter()
        .map(|name| {
            let name = escape(name);
            format!("<option value=\"{name}\">{name}</option>")
        })
        .collect();
    let indicators: String = view
        .indicators
        .iter()
        .map(|indicator| {
            format!(
                "<option value=\"{}\">{}</option>",
                indicator.key(),
                indicator.label()
            )
        })
        .collect();

    format!(
        "<h2>🔬 실험 준비하기</h2>\
         <form method=\"post\" action=\"/experiment/start\">\
         <p><label>어떤 용액을 관찰해볼까요? <select name=\"solution\">\
         <option value=\"\">용액을 선택하세요</option>{solutions}</select></label></p>\
         <p><label>어떤 지시약을 사용해볼까요? <select name=\"indicator\">\
         <option value=\"\">지시약을 선택하세요</option>{indicators}</select></label></p>\
         <button type=\"submit\">🧪 실험 시작!</button></form><hr>\
         <h3>💡 새로운 용액 탐구 요청하기</h3>\
         <form method=\"post\" action=\"/requests\">\
         <label>실험해보고 싶은 다른 용액이 있나요? \
         <input name=\"name\" placeholder=\"예: 오렌지 주스, 샴푸\"></label> \
         <button type=\"submit\">요청 보내기</button></form>"
    )
}

fn result_section(view: &LearnerView) -> String {
    let (Some(selection), Some(outcome)) = (view.selection.as_ref(), view.outcome()) else {
        return String::new();
    };
    format!(
        "<h2>📊 '{solution}' 실험 결과</h2>\
         <figure><img src=\"/assets/{file}\" alt=\"{caption}\" width=\"250\" height=\"250\">\
         <figcaption>{caption}</figcaption></figure><hr>\
         <h3>🤔 결과 분석하기</h3>\
         <form method=\"post\" action=\"/experiment/check\"><fieldset>\
         <legend>실험 결과를 보고 이 용액이 무엇이라고 생각하나요?</legend>{choices}</fieldset>\
         <button type=\"submit\">결과 확인하기</button></form>",
        solution = escape(&selection.solution.name),
        file = outcome.asset_file(),
        caption = outcome.caption(),
        choices = property_radios("choice", None),
    )
}

fn property_radios(name: &str, checked: Option<Property>) -> String {
    Property::ALL
        .iter()
        .map(|property| {
            let checked = if checked == Some(*property) {
                " checked"
            } else {
                ""
            };
            format!(
                "<label><input type=\"radio\" name=\"{name}\" value=\"{}\"{checked}> {}</label> ",
                property.key(),
                property.label()
            )
        })
        .collect()
}

fn log_section(log: &[LogEntry]) -> String {
    let mut html = String::from("<details open><summary>📖 나의 탐구 일지 보기</summary>");
    if log.is_empty() {
        html.push_str(&notice(&Notice::info(
            "아직 기록된 실험이 없습니다. 첫 실험을 시작해보세요!",
        )));
    } else {
        html.push_str(&log_table(log));
        html.push_str(
            "<form method=\"post\" action=\"/log/clear\">\
             <button type=\"submit\">⚠️ 탐구 일지 모두 지우기</button></form>",
        );
    }
    html.push_str(
        "<hr><h3>👩‍🏫 선생님께 탐구일지 전송하기</h3>\
         <form method=\"post\" action=\"/log/submit\">\
         <label>학년 <input name=\"grade\"></label> \
         <label>반 <input name=\"class_num\"></label> \
         <label>번호 <input name=\"student_num\"></label> \
         <label>이름 <input name=\"name\"></label> \
         <button type=\"submit\">전송하기</button></form></details>",
    );
    html
}

fn log_table(log: &[LogEntry]) -> String {
    let rows: String = log
        .iter()
        .map(|entry| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&entry.solution_name),
                entry.indicator.label(),
                entry.predicted.label(),
                entry.actual.label(),
                entry.verdict_label()
            )
        })
        .collect();
    format!(
        "<table><thead><tr><th>용액</th><th>사용한 지시약</th><th>나의 예상</th>\
         <th>실제 결과</th><th>정답 여부</th></tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn secret_form() -> String {
    "<form method=\"post\" action=\"/teacher\">\
     <label>선생님 비밀번호를 입력하세요. <input type=\"password\" name=\"secret\"></label> \
     <button type=\"submit\">확인</button></form>"
        .to_string()
}

fn hidden_secret(panel: &TeacherPanel) -> String {
    format!(
        "<input type=\"hidden\" name=\"secret\" value=\"{}\">",
        escape(&panel.secret)
    )
}

fn requests_tab(panel: &TeacherPanel) -> String {
    let mut html = String::from("<section><h3>학생들이 요청한 용액 목록</h3>");
    if panel.requests.is_empty() {
        html.push_str(&notice(&Notice::info(
            "아직 학생들이 요청한 새로운 용액이 없습니다.",
        )));
    }
    for request in &panel.requests {
        let name = escape(request);
        html.push_str(&format!(
            "<form method=\"post\" action=\"/teacher/approve\">{secret}\
             <input type=\"hidden\" name=\"name\" value=\"{name}\">\
             <strong>요청 용액:</strong> <code>{name}</code> {radios}\
             <button type=\"submit\">추가하기</button></form>",
            secret = hidden_secret(panel),
            radios = property_radios("property", Some(Property::Acidic)),
        ));
    }
    html.push_str("</section>");
    html
}

fn submissions_tab(panel: &TeacherPanel) -> String {
    let mut html = String::from("<section><h3>학생들이 제출한 탐구일지</h3>");
    if panel.submissions.is_empty() {
        html.push_str(&notice(&Notice::info("아직 제출된 탐구일지가 없습니다.")));
        html.push_str("</section>");
        return html;
    }

    html.push_str(&format!(
        "<form method=\"post\" action=\"/teacher/submissions/clear\">{}\
         <button type=\"submit\">⚠️ 모든 제출 기록 지우기</button></form>",
        hidden_secret(panel)
    ));
    for submission in &panel.submissions {
        html.push_str(&format!(
            "<article><p><strong>제출자:</strong> {} ({})</p>{}</article>",
            escape(&submission.info),
            escape(&submission.timestamp),
            log_table(&submission.log)
        ));
    }
    html.push_str("</section>");
    html
}

fn notices(notices: &[Notice]) -> String {
    notices.iter().map(notice).collect()
}

fn notice(notice: &Notice) -> String {
    let class = match notice.level {
        NoticeLevel::Success => "success",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    format!(
        "<p class=\"notice {class}\">{}</p>",
        escape(&notice.message)
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
