use chrono::{DateTime, Timelike, Utc};

use crate::models::{DailySummary, Meal, MealType, NutritionResult, WaterTracker};

/// Today's meal list and water counter, held in memory by the client view.
#[derive(Debug, Clone, Default)]
pub struct MealDiary {
    meals: Vec<Meal>,
    water: WaterTracker,
}

impl MealDiary {
    pub fn new(water_goal: u32) -> Self {
        Self {
            meals: Vec::new(),
            water: WaterTracker::new(water_goal),
        }
    }

    pub fn with_meals(meals: Vec<Meal>, water: WaterTracker) -> Self {
        Self { meals, water }
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn water(&self) -> WaterTracker {
        self.water
    }

    fn next_id(&self) -> i64 {
        self.meals.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }

    /// Appends an accepted photo analysis as an eaten meal.
    pub fn add_analyzed(&mut self, result: NutritionResult, at: DateTime<Utc>) -> &Meal {
        let meal = Meal {
            id: self.next_id(),
            meal_type: MealType::for_hour(at.hour()),
            time: at.format("%H:%M").to_string(),
            name: result.name,
            calories: result.calories,
            protein: result.protein,
            carbs: result.carbs,
            fats: result.fats,
            portion_size: result.portion_size,
            completed: true,
            created_at: at,
        };

        log::info!("🍽️ Diary: added {} '{}' ({} kcal)", meal.meal_type, meal.name, meal.calories);

        self.meals.push(meal);
        &self.meals[self.meals.len() - 1]
    }

    /// Flips a meal's completion flag; `None` if no meal has that id.
    pub fn toggle_meal(&mut self, id: i64) -> Option<bool> {
        let meal = self.meals.iter_mut().find(|m| m.id == id)?;
        meal.completed = !meal.completed;
        Some(meal.completed)
    }

    pub fn add_water(&mut self) -> bool {
        let added = self.water.add_glass();
        if !added {
            log::debug!("💧 Water goal of {} glasses already reached", self.water.goal);
        }
        added
    }

    /// Totals over completed meals only.
    pub fn summary(&self) -> DailySummary {
        self.meals
            .iter()
            .filter(|m| m.completed)
            .fold(
                DailySummary {
                    water: self.water,
                    ..DailySummary::default()
                },
                |mut acc, meal| {
                    acc.total_calories += meal.calories;
                    acc.total_protein += meal.protein;
                    acc.total_carbs += meal.carbs;
                    acc.total_fats += meal.fats;
                    acc.meals_completed += 1;
                    acc
                },
            )
    }
}
