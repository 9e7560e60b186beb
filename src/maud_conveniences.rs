use maud::{Markup, Render, html};

pub fn render_nav() -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md mb-8" {
            div class="max-w-4xl mx-auto px-4 py-3 flex flex-row items-center justify-between" {
                a href="/" class="text-xl font-bold hover:text-blue-300" {"Course Management System"}
            }
        }
    }
}

pub fn render_table<const N: usize>(
    titles: [Markup; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr class="odd:bg-gray-800 even:bg-gray-750" {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn error_alert(desc: impl Render) -> Markup {
    html! {
        div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
            strong class="font-bold" {"Error: "}
            span {(desc)}
        }
    }
}

pub struct FormInput<'a> {
    pub id: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub value: Option<&'a str>,
    pub error: Option<&'static str>,
    pub required: bool,
    pub disabled: bool,
    pub min: Option<&'static str>,
    pub max: Option<&'static str>,
    pub step: Option<&'static str>,
}

impl<'a> FormInput<'a> {
    pub const fn text(id: &'static str, label: &'static str, value: Option<&'a str>) -> Self {
        Self {
            id,
            label,
            input_type: "text",
            value,
            error: None,
            required: false,
            disabled: false,
            min: None,
            max: None,
            step: None,
        }
    }

    pub const fn number(id: &'static str, label: &'static str, value: Option<&'a str>) -> Self {
        Self {
            input_type: "number",
            ..Self::text(id, label, value)
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub const fn range(mut self, min: &'static str, max: &'static str, step: &'static str) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    #[must_use]
    pub const fn error(mut self, error: Option<&'static str>) -> Self {
        self.error = error;
        self
    }
}

impl Render for FormInput<'_> {
    fn render(&self) -> Markup {
        let border = if self.error.is_some() {
            "border-red-500"
        } else {
            "border-gray-600"
        };

        html! {
            div class="mb-4" {
                label for=(self.id) class="block text-sm font-bold mb-2 text-gray-300" {(self.label)}
                input type=(self.input_type) id=(self.id) name=(self.id) value=[self.value]
                    required[self.required] disabled[self.disabled]
                    min=[self.min] max=[self.max] step=[self.step]
                    class={"shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 disabled:opacity-50 " (border)} {}
                @if let Some(error) = self.error {
                    p class="text-red-400 text-xs italic mt-1" {(error)}
                }
            }
        }
    }
}

pub fn form_submit_button(text: &str) -> Markup {
    html! {
        button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
            (text)
        }
    }
}
