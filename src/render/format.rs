//! HTML markup for catalog sections, course cards and teacher badges.
//!
//! All text that comes from the CMS is escaped before it is inserted.

use crate::domain::{RenderGroup, ResolvedCourse, Teacher};

/// Bare section markup, suitable for injection into a host page.
pub fn render_fragment(groups: &[RenderGroup], link_prefix: &str) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"catalog\">\n");
    for group in groups {
        out.push_str(&format!(
            "<div class=\"catalog-group\" data-category=\"{}\">\n",
            escape_html(&group.key)
        ));
        out.push_str(&format!(
            "<h2 class=\"catalog-group-title\">{}</h2>\n",
            escape_html(&group.title)
        ));
        out.push_str("<div class=\"catalog-grid\">\n");
        for item in &group.items {
            out.push_str(&render_card(item, link_prefix));
        }
        out.push_str("</div>\n</div>\n");
    }
    out.push_str("</section>\n");
    out
}

/// One course card, including its teacher badges.
pub fn render_card(item: &ResolvedCourse, link_prefix: &str) -> String {
    let course = &item.course;
    let mut out = String::new();

    out.push_str(&format!(
        "<a class=\"catalog-card\" href=\"{}\" data-id=\"{}\">\n",
        escape_html(&format!("{link_prefix}{}", course.slug)),
        escape_html(&course.id)
    ));
    if let Some(url) = &course.image_url {
        out.push_str(&format!(
            "<img class=\"catalog-card-image\" src=\"{}\" alt=\"{}\" loading=\"lazy\">\n",
            escape_html(url),
            escape_html(&course.name)
        ));
    }
    out.push_str(&format!(
        "<h3 class=\"catalog-card-title\">{}</h3>\n",
        escape_html(&course.name)
    ));

    if !item.teachers.is_empty() {
        out.push_str("<ul class=\"catalog-teachers\">\n");
        for teacher in &item.teachers {
            out.push_str(&render_teacher(teacher));
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</a>\n");
    out
}

fn render_teacher(teacher: &Teacher) -> String {
    let portrait = teacher
        .portrait_url
        .as_deref()
        .map(|url| {
            format!(
                "<img class=\"catalog-teacher-portrait\" src=\"{}\" alt=\"\" loading=\"lazy\">",
                escape_html(url)
            )
        })
        .unwrap_or_default();
    format!(
        "<li class=\"catalog-teacher\">{portrait}<span>{}</span></li>\n",
        escape_html(&teacher.name)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;

    fn item(teachers: Vec<Teacher>) -> ResolvedCourse {
        ResolvedCourse {
            course: Course {
                id: "c1".to_string(),
                name: "Orchestration".to_string(),
                slug: "orchestration".to_string(),
                image_url: Some("https://cdn/o.jpg".to_string()),
                ..Course::default()
            },
            teachers,
        }
    }

    #[test]
    fn card_links_to_slug_and_lists_teachers() {
        let card = render_card(
            &item(vec![Teacher {
                id: "t1".to_string(),
                name: "Ada".to_string(),
                portrait_url: Some("https://cdn/ada.jpg".to_string()),
            }]),
            "https://school.example/p/",
        );

        assert!(card.contains("href=\"https://school.example/p/orchestration\""));
        assert!(card.contains("src=\"https://cdn/o.jpg\""));
        assert!(card.contains("<span>Ada</span>"));
        assert_eq!(card.matches("class=\"catalog-teacher\"").count(), 1);
    }

    #[test]
    fn card_without_teachers_has_no_badge_list() {
        let card = render_card(&item(Vec::new()), "/courses/");
        assert!(!card.contains("catalog-teachers"));
    }

    #[test]
    fn untrusted_text_is_escaped() {
        let mut evil = item(Vec::new());
        evil.course.name = "<script>alert('x')</script>".to_string();
        evil.course.slug = "\"onmouseover=\"x".to_string();

        let card = render_card(&evil, "/courses/");
        assert!(!card.contains("<script>"));
        assert!(card.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(card.contains("href=\"/courses/&quot;onmouseover=&quot;x\""));
    }

    #[test]
    fn empty_groups_still_render_sections() {
        let groups = vec![RenderGroup {
            title: "Piano".to_string(),
            key: "piano".to_string(),
            items: Vec::new(),
        }];
        let html = render_fragment(&groups, "/courses/");
        assert!(html.contains("<h2 class=\"catalog-group-title\">Piano</h2>"));
        assert!(html.contains("<div class=\"catalog-grid\">\n</div>"));

        assert_eq!(render_fragment(&[], "/"), "<section class=\"catalog\">\n</section>\n");
    }
}
