use insta::assert_snapshot;
use nasur_bot::bot::views::{render_result, DefaultSearchView, SearchView};
use nasur_bot::search::SearchResult;

#[test]
fn test_result_card_snapshot() {
    let result = SearchResult {
        id: "JGwWNGJdvx8".to_string(),
        title: Some("Ed Sheeran - Shape of You".to_string()),
        uploader: Some("Ed Sheeran".to_string()),
        duration: Some(125),
    };
    assert_snapshot!(render_result(&result, 0, 5).text, @r"
🎶 <b>Ed Sheeran - Shape of You</b>
📺 القناة: Ed Sheeran
⏳ المدة: 2:05

📱 المطور: ﴿ناصر﴾
");
}

#[test]
fn test_help_snapshot() {
    assert_snapshot!(DefaultSearchView::help_message(), @r"
📖 <b>طريقة الاستخدام</b>

اكتب:
نصور اسم الأغنية

وسيعرض لك النتائج.

📱 المطور: ﴿ناصر﴾
");
}
