//! Server-side page rendering. Each function takes the data a route
//! handler gathered and returns the markup for one page; everything
//! user-supplied is escaped on the way out.

use crate::database::models::{blog::Blog, comment::Comment};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn author_line(username: &str, display_name: Option<&str>) -> String {
    match display_name {
        Some(name) if !name.is_empty() => {
            format!("{} ({})", escape(name), escape(username))
        }
        _ => escape(username),
    }
}

/// Post index, in the order the storage layer returned them.
pub fn index(blogs: &[Blog]) -> String {
    let mut items = String::new();
    for blog in blogs {
        items.push_str(&format!(
            "<li><a href=\"/blogs/{}\">{}</a> by {}</li>\n",
            escape(&blog.id),
            escape(&blog.title),
            author_line(&blog.author_username, blog.author_display_name.as_deref()),
        ));
    }

    page(
        "All posts",
        &format!(
            "<h1>All posts</h1>\n<ul>\n{}</ul>\n<a href=\"/blogs/new\">New post</a>\n",
            items
        ),
    )
}

/// A single post with its comments expanded, in list order.
pub fn show_blog(blog: &Blog, comments: &[Comment]) -> String {
    let mut comment_items = String::new();
    for comment in comments {
        comment_items.push_str(&format!(
            "<li>{} &mdash; {} \
             <a href=\"/blogs/{blog_id}/comments/{comment_id}/edit\">edit</a>\n\
             <form action=\"/blogs/{blog_id}/comments/{comment_id}?_method=DELETE\" method=\"post\">\
             <button type=\"submit\">delete</button></form></li>\n",
            escape(&comment.content),
            author_line(
                &comment.author_username,
                comment.author_display_name.as_deref()
            ),
            blog_id = escape(&blog.id),
            comment_id = escape(&comment.id),
        ));
    }

    let body = format!(
        "<h1>{title}</h1>\n\
         <img src=\"{image}\" alt=\"\">\n\
         <p>{body}</p>\n\
         <p>by {author} on {created}</p>\n\
         <a href=\"/blogs/{id}/edit\">Edit</a>\n\
         <form action=\"/blogs/{id}?_method=DELETE\" method=\"post\">\
         <button type=\"submit\">Delete</button></form>\n\
         <h2>Comments</h2>\n<ul>\n{comments}</ul>\n\
         <a href=\"/blogs/{id}/comments/new\">Add a comment</a>\n\
         <a href=\"/blogs\">Back</a>\n",
        title = escape(&blog.title),
        image = escape(&blog.image_url),
        body = escape(&blog.body),
        author = author_line(&blog.author_username, blog.author_display_name.as_deref()),
        created = blog.created_at.format("%Y-%m-%d %H:%M"),
        id = escape(&blog.id),
        comments = comment_items,
    );

    page(&blog.title, &body)
}

pub fn register_form() -> String {
    page(
        "Register",
        "<h1>Register</h1>\n\
         <form action=\"/register\" method=\"post\">\n\
         <input name=\"username\" placeholder=\"username\">\n\
         <input name=\"password\" type=\"password\" placeholder=\"password\">\n\
         <input name=\"display_name\" placeholder=\"display name (optional)\">\n\
         <button type=\"submit\">Register</button>\n\
         </form>\n",
    )
}

pub fn login_form() -> String {
    page(
        "Login",
        "<h1>Login</h1>\n\
         <form action=\"/login\" method=\"post\">\n\
         <input name=\"username\" placeholder=\"username\">\n\
         <input name=\"password\" type=\"password\" placeholder=\"password\">\n\
         <button type=\"submit\">Login</button>\n\
         </form>\n",
    )
}

pub fn new_blog_form() -> String {
    page(
        "New post",
        "<h1>New post</h1>\n\
         <form action=\"/blogs\" method=\"post\">\n\
         <input name=\"title\" placeholder=\"title\">\n\
         <input name=\"image_url\" placeholder=\"image url (optional)\">\n\
         <textarea name=\"body\"></textarea>\n\
         <button type=\"submit\">Publish</button>\n\
         </form>\n",
    )
}

pub fn edit_blog_form(blog: &Blog) -> String {
    page(
        "Edit post",
        &format!(
            "<h1>Edit post</h1>\n\
             <form action=\"/blogs/{id}?_method=PUT\" method=\"post\">\n\
             <input name=\"title\" value=\"{title}\">\n\
             <input name=\"image_url\" value=\"{image}\">\n\
             <textarea name=\"body\">{body}</textarea>\n\
             <button type=\"submit\">Save</button>\n\
             </form>\n",
            id = escape(&blog.id),
            title = escape(&blog.title),
            image = escape(&blog.image_url),
            body = escape(&blog.body),
        ),
    )
}

pub fn new_comment_form(blog: &Blog) -> String {
    page(
        "New comment",
        &format!(
            "<h1>Comment on: {title}</h1>\n\
             <form action=\"/blogs/{id}/comments\" method=\"post\">\n\
             <textarea name=\"content\"></textarea>\n\
             <button type=\"submit\">Comment</button>\n\
             </form>\n",
            title = escape(&blog.title),
            id = escape(&blog.id),
        ),
    )
}

pub fn edit_comment_form(blog_id: &str, comment: &Comment) -> String {
    page(
        "Edit comment",
        &format!(
            "<h1>Edit comment</h1>\n\
             <form action=\"/blogs/{blog_id}/comments/{id}?_method=PUT\" method=\"post\">\n\
             <textarea name=\"content\">{content}</textarea>\n\
             <button type=\"submit\">Save</button>\n\
             </form>\n",
            blog_id = escape(blog_id),
            id = escape(&comment.id),
            content = escape(&comment.content),
        ),
    )
}
